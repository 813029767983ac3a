use crate::catalog::{HttpImageFetcher, Materializer};
use crate::config::CrawlRequest;
use crate::error::CrawlError;
use crate::extract::CardExtractor;
use crate::page::PageController;
use crate::results::CrawlResult;
use std::time::Duration;
use url::Url;

/// One crawl session: navigate, optionally log in, scroll until stable,
/// extract candidates and materialize the catalog
///
/// The single operation an orchestrator calls. Owns the browser client for
/// the duration of the call and releases it on every exit path.
pub struct CrawlSession {
    request: CrawlRequest,
    webdriver_url: String,
}

impl CrawlSession {
    /// Create a session for one request
    pub fn new(request: CrawlRequest, webdriver_url: impl Into<String>) -> Self {
        Self {
            request,
            webdriver_url: webdriver_url.into(),
        }
    }

    /// Run the session to completion
    pub async fn run(self) -> Result<CrawlResult, CrawlError> {
        ::log::info!("starting crawl session for {}", self.request.target_url);

        let page = PageController::connect(&self.webdriver_url).await?;

        // The pipeline runs in a helper so the client is closed on both the
        // success and failure paths
        let result = self.drive(&page).await;
        page.close().await;

        match &result {
            Ok(outcome) => ::log::info!("crawl session finished: {} rows", outcome.item_count),
            Err(e) => ::log::error!("crawl session failed: {}", e),
        }
        result
    }

    async fn drive(&self, page: &PageController) -> Result<CrawlResult, CrawlError> {
        page.load(&self.request.target_url).await?;

        if let Some((username, password)) = self.request.credentials() {
            page.try_login(username, password).await;
        }

        let scroll_state = page
            .scroll_to_stable(Duration::from_millis(self.request.scroll_delay_ms))
            .await;
        ::log::debug!("page loading ended in {:?}", scroll_state);

        let html = page.snapshot(&self.request.target_url).await?;

        // Login may have redirected; resolve image sources against wherever
        // the browser actually ended up
        let base_url = match page.current_url().await {
            Some(url) => Some(url),
            None => Url::parse(&self.request.target_url).ok(),
        };

        let extractor = CardExtractor::default();
        let candidates = extractor.extract(&html, base_url.as_ref());
        ::log::info!("found {} product candidates", candidates.len());

        let materializer = Materializer::new(HttpImageFetcher::new());
        materializer
            .materialize(
                &candidates,
                self.request.max_items,
                &self.request.csv_path,
                &self.request.img_dir,
            )
            .await
    }
}
