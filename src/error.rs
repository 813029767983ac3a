use std::path::PathBuf;
use thiserror::Error;

/// Fatal session errors
///
/// Only these cross the session boundary; heuristic misses and per-image
/// failures are absorbed inside the pipeline so one bad element cannot
/// poison the crawl.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("failed to connect to WebDriver at {url}: {source}")]
    WebDriver {
        url: String,
        #[source]
        source: fantoccini::error::NewSessionError,
    },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("failed to write catalog CSV to {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-image fetch/storage failure
///
/// Represented as a result value rather than propagated: the affected row is
/// kept without an image file and the session continues.
#[derive(Error, Debug)]
pub enum ImageFetchError {
    #[error("image request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to store image at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
