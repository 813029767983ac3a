use crate::error::CrawlError;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use url::Url;

/// Budget for the initial navigation to reach a parseable state
const NAVIGATION_BUDGET: Duration = Duration::from_secs(60);

/// Settle time after clicking the login button; WebDriver has no
/// network-idle signal to wait on
const LOGIN_SETTLE: Duration = Duration::from_secs(2);

/// Iteration cap for the scroll-to-stable loop
pub const MAX_SCROLL_ITERATIONS: u32 = 30;

/// Login button labels probed during the login heuristic
const LOGIN_LABELS: [&str; 3] = ["entrar", "login", "sign in"];

/// State of the scroll-to-stable loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    /// Height grew since the last read; keep scrolling
    Loading,
    /// Height stopped increasing between two consecutive reads
    Stabilized,
    /// Iteration cap reached before the height settled
    Capped,
}

/// Pure termination tracker for the scroll loop
///
/// Separated from the browser so the termination condition is auditable and
/// testable against adversarial height sequences.
#[derive(Debug)]
pub struct ScrollTracker {
    last_height: u64,
    iterations: u32,
    cap: u32,
}

impl ScrollTracker {
    /// Create a tracker that allows at most `cap` scroll iterations
    pub fn new(cap: u32) -> Self {
        Self {
            last_height: 0,
            iterations: 0,
            cap,
        }
    }

    /// Feed one height reading and decide whether to keep scrolling
    ///
    /// Stability is checked before the cap so a page that settles exactly on
    /// the last allowed iteration reports `Stabilized`, not `Capped`.
    pub fn observe(&mut self, height: u64) -> ScrollState {
        if height == self.last_height {
            return ScrollState::Stabilized;
        }
        if self.iterations >= self.cap {
            return ScrollState::Capped;
        }
        self.last_height = height;
        self.iterations += 1;
        ScrollState::Loading
    }
}

/// Drives the headless browser for one page: navigation, best-effort login
/// and scroll-triggered content loading
pub struct PageController {
    client: Client,
}

impl PageController {
    /// Connect to the WebDriver instance
    pub async fn connect(webdriver_url: &str) -> Result<Self, CrawlError> {
        match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("connected to WebDriver at {}", webdriver_url);
                Ok(Self { client })
            }
            Err(e) => Err(CrawlError::WebDriver {
                url: webdriver_url.to_string(),
                source: e,
            }),
        }
    }

    /// Navigate to the target URL within the navigation budget
    pub async fn load(&self, target_url: &str) -> Result<(), CrawlError> {
        match tokio::time::timeout(NAVIGATION_BUDGET, self.client.goto(target_url)).await {
            Ok(Ok(_)) => {
                ::log::info!("loaded {}", target_url);
                Ok(())
            }
            Ok(Err(e)) => Err(CrawlError::Navigation {
                url: target_url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CrawlError::Navigation {
                url: target_url.to_string(),
                reason: format!(
                    "did not reach a parseable state within {}s",
                    NAVIGATION_BUDGET.as_secs()
                ),
            }),
        }
    }

    /// Attempt a heuristic login; never fails
    ///
    /// Only runs when a password-type input exists. Every fill/click step is
    /// individually best-effort: a missing field or failed interaction leaves
    /// the page as-is and the crawl proceeds.
    pub async fn try_login(&self, username: &str, password: &str) {
        let Ok(password_field) = self.client.find(Locator::Css("input[type='password']")).await
        else {
            ::log::debug!("no password field present, skipping login");
            return;
        };

        ::log::info!("password field present, attempting login");

        match self.find_username_field().await {
            Some(field) => {
                if let Err(e) = field.send_keys(username).await {
                    ::log::debug!("failed to fill username field: {}", e);
                }
            }
            None => ::log::debug!("no username field found"),
        }

        if let Err(e) = password_field.send_keys(password).await {
            ::log::debug!("failed to fill password field: {}", e);
        }

        match self.find_login_button().await {
            Some(button) => {
                if let Err(e) = button.click().await {
                    ::log::debug!("failed to click login button: {}", e);
                }
                tokio::time::sleep(LOGIN_SETTLE).await;
            }
            None => ::log::debug!("no login button found"),
        }
    }

    /// First email-type input, else first input whose name/id mentions
    /// "user" or "email"
    async fn find_username_field(&self) -> Option<Element> {
        if let Ok(field) = self.client.find(Locator::Css("input[type='email']")).await {
            return Some(field);
        }

        let inputs = self.client.find_all(Locator::Css("input")).await.ok()?;
        for input in inputs {
            let name = input.attr("name").await.ok().flatten();
            let id = input.attr("id").await.ok().flatten();
            if is_user_field(name.as_deref(), id.as_deref()) {
                return Some(input);
            }
        }
        None
    }

    /// First button with a known login label, else a submit-type input
    async fn find_login_button(&self) -> Option<Element> {
        if let Ok(buttons) = self.client.find_all(Locator::Css("button")).await {
            for button in buttons {
                if let Ok(text) = button.text().await {
                    if is_login_label(&text) {
                        return Some(button);
                    }
                }
            }
        }

        self.client
            .find(Locator::Css("input[type='submit']"))
            .await
            .ok()
    }

    /// Scroll to the bottom until the document height stops increasing or
    /// the iteration cap is hit, waiting `delay` between steps
    pub async fn scroll_to_stable(&self, delay: Duration) -> ScrollState {
        let mut tracker = ScrollTracker::new(MAX_SCROLL_ITERATIONS);

        loop {
            let height = self.read_scroll_height().await;
            match tracker.observe(height) {
                ScrollState::Loading => {
                    if let Err(e) = self
                        .client
                        .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
                        .await
                    {
                        ::log::debug!("scroll step failed: {}", e);
                    }
                    tokio::time::sleep(delay).await;
                }
                state => {
                    ::log::debug!("scroll loop finished: {:?}", state);
                    return state;
                }
            }
        }
    }

    /// Read the document scroll height, defaulting to 0 on failure
    async fn read_scroll_height(&self) -> u64 {
        match self
            .client
            .execute("return document.body.scrollHeight;", vec![])
            .await
        {
            Ok(value) => value
                .as_u64()
                .or_else(|| value.as_f64().map(|f| f as u64))
                .unwrap_or(0),
            Err(e) => {
                ::log::debug!("failed to read scroll height: {}", e);
                0
            }
        }
    }

    /// Serialized snapshot of the rendered page
    pub async fn snapshot(&self, target_url: &str) -> Result<String, CrawlError> {
        self.client
            .source()
            .await
            .map_err(|e| CrawlError::Navigation {
                url: target_url.to_string(),
                reason: format!("failed to read page source: {e}"),
            })
    }

    /// Current URL after navigation and any login redirect
    pub async fn current_url(&self) -> Option<Url> {
        self.client.current_url().await.ok()
    }

    /// Close the WebDriver session; failures are logged, not propagated
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("failed to close WebDriver session: {}", e);
        }
    }
}

/// Whether an input's name/id marks it as a username/email field
fn is_user_field(name: Option<&str>, id: Option<&str>) -> bool {
    let mentions_user = |value: &str| {
        let value = value.to_lowercase();
        value.contains("user") || value.contains("email")
    };
    name.is_some_and(mentions_user) || id.is_some_and(mentions_user)
}

/// Whether a button's text matches a known login label
fn is_login_label(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    LOGIN_LABELS.iter().any(|label| text.contains(label))
}
