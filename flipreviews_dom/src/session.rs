//! The capability surface the extraction pipeline depends on.
//!
//! Backends render and query pages however they like (headless Chrome,
//! plain HTTP + CSS selectors); the pipeline only ever sees text.

use std::time::Duration;

use async_trait::async_trait;

use crate::DomError;

/// One text-bearing element matched by a query.
#[derive(Debug, Clone)]
pub struct Node {
    /// Rendered text content, with newlines separating block-level children.
    pub text: String,
    /// Link target, when the element is a hyperlink.
    pub href: Option<String>,
}

/// A live page session: one loaded page at a time, queried by CSS pattern.
///
/// Query methods return whatever is currently present; an empty result is
/// not an error. Implementations must release all underlying resources on
/// drop so a crawl can never leak a browser or connection pool.
#[async_trait]
pub trait PageSession: Send {
    /// Navigates the session to `url`, replacing any previously loaded page.
    async fn load_page(&mut self, url: &str) -> Result<(), DomError>;

    /// Waits until any of `patterns` matches at least one element, or the
    /// timeout elapses. Returns whether a match appeared.
    async fn wait_for_any(
        &mut self,
        patterns: &[&str],
        timeout: Duration,
    ) -> Result<bool, DomError>;

    /// Returns the elements matching `pattern`, in document order.
    fn query_elements(&self, pattern: &str) -> Result<Vec<Node>, DomError>;

    /// For each element matching `container_pattern`, returns the texts of
    /// its descendants matching `child_pattern`. The outer vector is in
    /// document order and has one entry per container element.
    fn query_nested(
        &self,
        container_pattern: &str,
        child_pattern: &str,
    ) -> Result<Vec<Vec<String>>, DomError>;

    /// Scrolls the page to the bottom so lazily rendered content loads.
    fn scroll_to_bottom(&mut self) -> Result<(), DomError>;
}
