//! Error types for the page-session backends.

/// Errors that can occur while driving a page session.
#[derive(thiserror::Error, Debug)]
pub enum DomError {
    /// The browser session could not be launched or acquired.
    #[error("browser session error: {0}")]
    Session(String),
    /// Navigating to a URL failed.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    /// An HTTP request failed (static backend).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server returned a non-success status (static backend).
    #[error("unexpected status {status} for {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },
    /// A selector pattern could not be parsed.
    #[error("invalid query pattern `{0}`")]
    Pattern(String),
    /// In-page script evaluation failed.
    #[error("script evaluation failed: {0}")]
    Eval(String),
    /// A query was issued before any page was loaded.
    #[error("no page loaded")]
    NoPage,
}
