//! Error types for the crawl layer.
//!
//! Only two failures abort a crawl: a reviews URL that cannot be resolved
//! and a dead page session. Page- and container-level problems are logged
//! and skipped inside the controller, and the field extractors return
//! `Option` so a malformed container can never propagate an error.

use flipreviews_dom::DomError;

/// Errors that abort an entire crawl run.
#[derive(thiserror::Error, Debug)]
pub enum CrawlError {
    /// No reviews-listing URL could be determined for the given input.
    #[error("could not determine a reviews URL for {url}")]
    UrlResolution { url: String },
    /// The page session failed while resolving the reviews URL.
    #[error("page session error: {0}")]
    Dom(#[from] DomError),
}
