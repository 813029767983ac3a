use crate::results::ProductCandidate;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Hard cap on extracted candidates, applied before any max-items truncation
pub const MAX_CANDIDATES: usize = 800;

/// Tags that render as their own line, used to linearize visible text
const BLOCK_TAGS: [&str; 24] = [
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dd",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "p",
    "section",
    "table",
    "tr",
];

/// Tags whose content never renders
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extracts product candidates from a rendered page snapshot
///
/// Operates on serialized HTML rather than a live browser: candidate elements
/// are anchors/divs/list-items/articles with an image descendant whose visible
/// text looks price-like. False positives and negatives are accepted; this is
/// a site-agnostic heuristic.
pub struct CardExtractor {
    card_selector: Selector,
    img_selector: Selector,
    anchor_selector: Selector,
    broad_price: Regex,
    narrow_price: Regex,
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self::new().expect("built-in price patterns should be valid")
    }
}

impl CardExtractor {
    /// Create a new extractor, compiling the price patterns
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            card_selector: Selector::parse("a, div, li, article").unwrap(),
            img_selector: Selector::parse("img").unwrap(),
            anchor_selector: Selector::parse("a").unwrap(),
            // Broad filter: currency symbol followed by digits, or a bare
            // number with a 2-digit decimal group
            broad_price: Regex::new(r"(R\$|\$|€)\s*\d+|\d+[.,]\d{2}")?,
            // Narrow match: optional currency, 1-5 digits, decimal separator,
            // exactly 2 decimals
            narrow_price: Regex::new(r"(R\$|\$|€)?\s*\d{1,5}[.,]\d{2}")?,
        })
    }

    /// Extract up to [`MAX_CANDIDATES`] product candidates in document order
    ///
    /// `base_url` is used to resolve relative image sources; when it is
    /// absent the declared source attribute is kept as-is.
    pub fn extract(&self, html: &str, base_url: Option<&Url>) -> Vec<ProductCandidate> {
        let doc = Html::parse_document(html);
        let mut candidates = Vec::new();

        for element in doc.select(&self.card_selector) {
            let Some(img) = element.select(&self.img_selector).next() else {
                continue;
            };

            let text = visible_text(&element);
            let text = text.trim();
            if text.is_empty() || text.chars().count() < 4 {
                continue;
            }
            if !self.broad_price.is_match(text) {
                continue;
            }

            let raw_name = text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("")
                .to_string();

            // The broad filter may pass while the narrow pattern finds
            // nothing (e.g. "R$ 199" with no decimals); the price stays empty
            let raw_price_text = self
                .narrow_price
                .find(text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            let image_url = resolve_image_url(&img, base_url);
            let link = element
                .value()
                .attr("href")
                .map(str::to_string)
                .or_else(|| {
                    element
                        .select(&self.anchor_selector)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(str::to_string)
                })
                .unwrap_or_default();

            candidates.push(ProductCandidate::new(
                raw_name,
                raw_price_text,
                image_url,
                link,
            ));

            if candidates.len() >= MAX_CANDIDATES {
                ::log::debug!("candidate cap of {} reached, stopping early", MAX_CANDIDATES);
                break;
            }
        }

        candidates
    }
}

/// Resolve the image source, preferring `src` over `data-src`
fn resolve_image_url(img: &ElementRef, base_url: Option<&Url>) -> String {
    let raw = img
        .value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .unwrap_or("");
    if raw.is_empty() {
        return String::new();
    }

    if let Some(base) = base_url {
        if let Ok(resolved) = base.join(raw) {
            return resolved.to_string();
        }
    }
    raw.to_string()
}

/// Linearize an element's visible text, inserting line breaks at block
/// boundaries so "first non-empty line" behaves like rendered text
fn visible_text(element: &ElementRef) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(elem) => {
                let name = elem.name();
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
