use serde::{Deserialize, Serialize};

/// A DOM element heuristically judged to represent a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCandidate {
    /// First non-empty line of the element's visible text
    pub raw_name: String,

    /// Price text as matched on the page; empty when the element passed the
    /// broad price filter but the narrow pattern found nothing
    pub raw_price_text: String,

    /// Resolved image source URL (empty if none could be determined)
    pub image_url: String,

    /// The element's own href, or its first descendant anchor's href
    pub link: String,
}

impl ProductCandidate {
    /// Create a new candidate
    pub fn new(raw_name: String, raw_price_text: String, image_url: String, link: String) -> Self {
        Self {
            raw_name,
            raw_price_text,
            image_url,
            link,
        }
    }
}

/// Outcome of a completed crawl session
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Number of catalog rows written to the CSV artifact
    pub item_count: usize,
}
