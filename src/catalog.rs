use crate::error::{CrawlError, ImageFetchError};
use crate::normalize::{normalize_price_br, sanitize_token};
use crate::results::{CrawlResult, ProductCandidate};
use regex::Regex;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Fixed CSV schema expected by the catalog importer
pub const CSV_HEADER: &str =
    "id;nome;descricao;preco;estoque;categoria;sku;tamanhos;cores;sabores;estoque_variantes;imagem";

/// Capability for fetching image bytes, stubbable in tests
pub trait ImageFetcher {
    /// Fetch the image at `url`, returning its bytes
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ImageFetchError>> + Send;
}

/// reqwest-backed fetcher used by live sessions
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with a per-request timeout
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("static client configuration should be valid");
        Self { client }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Converts candidates into the persisted CSV artifact plus best-effort
/// image files
pub struct Materializer<F> {
    fetcher: F,
    name_cleaner: Regex,
}

impl<F: ImageFetcher> Materializer<F> {
    /// Create a materializer over the given image fetcher
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            name_cleaner: Regex::new(r"[\r\n;]+").expect("name cleaning pattern should be valid"),
        }
    }

    /// Write the CSV artifact and download images for up to `limit`
    /// candidates, preserving extraction order
    ///
    /// Image failures never abort the session; only the final CSV write can
    /// fail fatally.
    pub async fn materialize(
        &self,
        candidates: &[ProductCandidate],
        limit: usize,
        csv_path: &Path,
        img_dir: &Path,
    ) -> Result<CrawlResult, CrawlError> {
        let kept = &candidates[..candidates.len().min(limit)];
        let csv = self.render_catalog(kept);

        if let Err(e) = tokio::fs::create_dir_all(img_dir).await {
            ::log::warn!(
                "could not create image directory {}: {}",
                img_dir.display(),
                e
            );
        }

        for (index, candidate) in kept.iter().enumerate() {
            let sku = format!("AUTO-{}", index + 1);
            let url = candidate.image_url.as_str();

            if url.is_empty() {
                continue;
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                ::log::debug!("skipping non-http image URL for {}: {}", sku, url);
                continue;
            }

            if let Err(e) = self.store_image(url, &sku, img_dir).await {
                ::log::debug!("image download for {} failed: {}", sku, e);
            }
        }

        tokio::fs::write(csv_path, &csv)
            .await
            .map_err(|e| CrawlError::Storage {
                path: csv_path.to_path_buf(),
                source: e,
            })?;
        ::log::info!(
            "wrote {} catalog rows to {}",
            kept.len(),
            csv_path.display()
        );

        Ok(CrawlResult {
            item_count: kept.len(),
        })
    }

    /// Render the CSV text for the given candidates
    ///
    /// Pure: identical input yields byte-identical output, with skus numbered
    /// from 1 in extraction order.
    pub fn render_catalog(&self, candidates: &[ProductCandidate]) -> String {
        let mut out = String::new();
        out.push_str(CSV_HEADER);
        out.push('\n');

        for (index, candidate) in candidates.iter().enumerate() {
            let sku = format!("AUTO-{}", index + 1);
            let name = self.name_cleaner.replace_all(&candidate.raw_name, " ");
            let name = name.trim();
            let price = normalize_price_br(&candidate.raw_price_text);

            let fields: [&str; 12] = [
                "",
                name,
                "",
                &price,
                "",
                "",
                &sku,
                "",
                "",
                "",
                "",
                &candidate.image_url,
            ];
            out.push_str(&fields.join(";"));
            out.push('\n');
        }

        out
    }

    /// Fetch one image and store it as `<sanitized-sku>.<ext>`
    ///
    /// The extension comes from the URL text, not the content type.
    async fn store_image(
        &self,
        url: &str,
        sku: &str,
        img_dir: &Path,
    ) -> Result<(), ImageFetchError> {
        let ext = if url.contains(".png") { "png" } else { "jpg" };
        let path = img_dir.join(format!("{}.{ext}", sanitize_token(sku)));

        let bytes = self.fetcher.fetch(url).await?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ImageFetchError::Store {
                path: path.clone(),
                source: e,
            })?;

        ::log::debug!("stored image for {} at {}", sku, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Fetcher that returns fixed bytes or always fails
    struct StubFetcher {
        fail: bool,
    }

    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
            if self.fail {
                Err(ImageFetchError::Store {
                    path: url.into(),
                    source: io::Error::other("stubbed network failure"),
                })
            } else {
                Ok(b"image-bytes".to_vec())
            }
        }
    }

    fn candidate(name: &str, price: &str, image_url: &str) -> ProductCandidate {
        ProductCandidate::new(
            name.to_string(),
            price.to_string(),
            image_url.to_string(),
            String::new(),
        )
    }

    fn materializer(fail: bool) -> Materializer<StubFetcher> {
        Materializer::new(StubFetcher { fail })
    }

    #[test]
    fn test_http_fetcher_builds() {
        // The builder config is static; construction must not panic
        let _ = HttpImageFetcher::new();
    }

    #[test]
    fn test_header_and_row_shape() {
        let candidates = vec![candidate("Produto A", "R$ 10,00", "https://x/a.jpg")];
        let csv = materializer(false).render_catalog(&candidates);

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some(";Produto A;;10,00;;;AUTO-1;;;;;https://x/a.jpg")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_sku_numbering_follows_extraction_order() {
        let candidates = vec![
            candidate("Produto A R$ 10,00", "R$ 10,00", ""),
            candidate("Produto B 20,50", "20,50", ""),
        ];
        let csv = materializer(false).render_catalog(&candidates);

        assert!(csv.contains(";10,00;;;AUTO-1;"));
        assert!(csv.contains(";20,50;;;AUTO-2;"));
    }

    #[test]
    fn test_name_cleaning_collapses_delimiters() {
        let candidates = vec![candidate("Produto;\r\ncom quebras", "1,00", "")];
        let csv = materializer(false).render_catalog(&candidates);
        assert!(csv.contains(";Produto com quebras;;1,00;"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let candidates = vec![
            candidate("Produto A", "10,00", "https://x/a.jpg"),
            candidate("Produto B", "20,50", "https://x/b.png"),
        ];
        let m = materializer(false);
        assert_eq!(m.render_catalog(&candidates), m.render_catalog(&candidates));
    }

    #[tokio::test]
    async fn test_limit_truncates_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");
        let candidates = vec![
            candidate("A", "1,00", ""),
            candidate("B", "2,00", ""),
            candidate("C", "3,00", ""),
        ];

        let result = materializer(false)
            .materialize(&candidates, 2, &csv_path, dir.path())
            .await
            .unwrap();

        assert_eq!(result.item_count, 2);
        let written = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(written.lines().count(), 3); // header + 2 rows
    }

    #[tokio::test]
    async fn test_limit_larger_than_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");
        let candidates = vec![candidate("A", "1,00", "")];

        let result = materializer(false)
            .materialize(&candidates, 500, &csv_path, dir.path())
            .await
            .unwrap();

        assert_eq!(result.item_count, 1);
    }

    #[tokio::test]
    async fn test_images_stored_with_sku_names() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");
        let img_dir = dir.path().join("imagens");
        let candidates = vec![
            candidate("A", "1,00", "https://x/a.jpg"),
            candidate("B", "2,00", "https://x/b.png?v=2"),
        ];

        materializer(false)
            .materialize(&candidates, 10, &csv_path, &img_dir)
            .await
            .unwrap();

        assert!(img_dir.join("auto-1.jpg").exists());
        assert!(img_dir.join("auto-2.png").exists());
    }

    #[tokio::test]
    async fn test_non_http_scheme_writes_row_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");
        let img_dir = dir.path().join("imagens");
        let candidates = vec![candidate("A", "1,00", "ftp://x/a.jpg")];

        let result = materializer(false)
            .materialize(&candidates, 10, &csv_path, &img_dir)
            .await
            .unwrap();

        assert_eq!(result.item_count, 1);
        assert!(!img_dir.join("auto-1.jpg").exists());
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("AUTO-1"));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_row() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");
        let img_dir = dir.path().join("imagens");
        let candidates = vec![candidate("A", "1,00", "https://x/a.jpg")];

        let result = materializer(true)
            .materialize(&candidates, 10, &csv_path, &img_dir)
            .await
            .unwrap();

        assert_eq!(result.item_count, 1);
        assert!(!img_dir.join("auto-1.jpg").exists());
    }

    #[tokio::test]
    async fn test_empty_candidates_write_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");

        let result = materializer(false)
            .materialize(&[], 10, &csv_path, dir.path())
            .await
            .unwrap();

        assert_eq!(result.item_count, 0);
        let written = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(written, format!("{CSV_HEADER}\n"));
    }

    #[tokio::test]
    async fn test_snapshot_to_catalog_pipeline() {
        // Three image-bearing elements, one without a price: two rows with
        // sequential skus and normalized prices
        let html = r#"
            <body>
                <div><img src="https://x/a.jpg">Produto A R$ 10,00</div>
                <div><img src="https://x/b.jpg">Produto B 20,50</div>
                <div><img src="https://x/c.jpg">no price here</div>
            </body>
        "#;
        let candidates = crate::extract::CardExtractor::default().extract(html, None);
        assert_eq!(candidates.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("produtos.csv");
        let result = materializer(false)
            .materialize(&candidates, 500, &csv_path, dir.path())
            .await
            .unwrap();
        assert_eq!(result.item_count, 2);

        let written = std::fs::read_to_string(&csv_path).unwrap();
        let rows: Vec<&str> = written.lines().skip(1).collect();
        assert!(rows[0].contains(";10,00;;;AUTO-1;"));
        assert!(rows[1].contains(";20,50;;;AUTO-2;"));
    }

    #[tokio::test]
    async fn test_unwritable_csv_destination_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("missing").join("produtos.csv");

        let result = materializer(false)
            .materialize(&[], 10, &csv_path, dir.path())
            .await;

        assert!(matches!(result, Err(CrawlError::Storage { .. })));
    }
}
