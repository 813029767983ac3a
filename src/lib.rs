// Re-export modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod page;
pub mod results;
pub mod session;

// Re-export commonly used types for convenience
pub use config::CrawlRequest;
pub use error::CrawlError;
pub use results::{CrawlResult, ProductCandidate};
pub use session::CrawlSession;

use std::path::PathBuf;

/// Builder for configuring and running a single-page catalog crawl
pub struct Crawl {
    request: CrawlRequest,
    webdriver_url: String,
}

impl Crawl {
    /// Create a new builder for the given target URL
    pub fn new(target_url: &str) -> Self {
        Self {
            request: CrawlRequest::new(target_url),
            webdriver_url: config::default_webdriver_url(),
        }
    }

    /// Create a builder from a fully specified request
    pub fn from_request(request: CrawlRequest) -> Self {
        Self {
            request,
            webdriver_url: config::default_webdriver_url(),
        }
    }

    /// Load the request from a JSON file
    pub fn from_config_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let request = CrawlRequest::from_file(path)?;
        Ok(Self::from_request(request))
    }

    /// Supply credentials for the best-effort login step
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.request.username = Some(username.to_string());
        self.request.password = Some(password.to_string());
        self
    }

    /// Set the maximum number of catalog rows to emit
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.request.max_items = max_items;
        self
    }

    /// Set the wait between scroll steps, in milliseconds
    pub fn with_scroll_delay_ms(mut self, delay_ms: u64) -> Self {
        self.request.scroll_delay_ms = delay_ms;
        self
    }

    /// Set the destination path for the CSV artifact
    pub fn with_csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.csv_path = path.into();
        self
    }

    /// Set the directory for downloaded product images
    pub fn with_img_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request.img_dir = dir.into();
        self
    }

    /// Set the WebDriver endpoint
    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }

    /// Run the crawl session
    pub async fn run(self) -> Result<CrawlResult, CrawlError> {
        let mut webdriver_url = self.webdriver_url;

        // Environment override, mainly for containerized setups
        if let Ok(env_url) = std::env::var("WEBDRIVER_URL") {
            if !env_url.is_empty() {
                webdriver_url = env_url;
            }
        }

        CrawlSession::new(self.request, webdriver_url).run().await
    }
}
