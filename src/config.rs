use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Configuration for one crawl session
///
/// Mirrors the JSON body an orchestrator would send: only the target URL is
/// required, everything else has a usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// URL of the catalog page to crawl
    pub target_url: String,

    /// Username for the optional login step
    #[serde(default)]
    pub username: Option<String>,

    /// Password for the optional login step
    #[serde(default)]
    pub password: Option<String>,

    /// Maximum number of catalog rows to emit
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Wait between scroll steps, in milliseconds
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,

    /// Destination path for the CSV artifact
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Directory for downloaded product images
    #[serde(default = "default_img_dir")]
    pub img_dir: PathBuf,
}

/// Default value for max_items
fn default_max_items() -> usize {
    500
}

/// Default value for scroll_delay_ms
fn default_scroll_delay_ms() -> u64 {
    800
}

/// Default CSV destination
fn default_csv_path() -> PathBuf {
    PathBuf::from("produtos.csv")
}

/// Default image directory
fn default_img_dir() -> PathBuf {
    PathBuf::from("imagens")
}

/// Default WebDriver endpoint (ChromeDriver/geckodriver behind a proxy, etc.)
pub fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl CrawlRequest {
    /// Create a new request with default values
    pub fn new(target_url: &str) -> Self {
        Self {
            target_url: target_url.to_string(),
            username: None,
            password: None,
            max_items: default_max_items(),
            scroll_delay_ms: default_scroll_delay_ms(),
            csv_path: default_csv_path(),
            img_dir: default_img_dir(),
        }
    }

    /// Load a request from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let request: Self = serde_json::from_str(&contents)?;
        Ok(request)
    }

    /// Load a request from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let request: Self = serde_json::from_str(json)?;
        Ok(request)
    }

    /// Returns the credential pair when both parts are present and non-empty.
    ///
    /// Empty strings count as absent so that form-filling is never attempted
    /// with blank values.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let request = CrawlRequest::from_json(r#"{"target_url": "https://shop.example"}"#).unwrap();
        assert_eq!(request.target_url, "https://shop.example");
        assert_eq!(request.max_items, 500);
        assert_eq!(request.scroll_delay_ms, 800);
        assert_eq!(request.csv_path, PathBuf::from("produtos.csv"));
        assert_eq!(request.img_dir, PathBuf::from("imagens"));
        assert!(request.credentials().is_none());
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let mut request = CrawlRequest::new("https://shop.example");
        assert!(request.credentials().is_none());

        request.username = Some("user@example.com".to_string());
        assert!(request.credentials().is_none());

        request.password = Some("secret".to_string());
        assert_eq!(request.credentials(), Some(("user@example.com", "secret")));

        // Blank values are treated as absent
        request.password = Some(String::new());
        assert!(request.credentials().is_none());
    }
}
