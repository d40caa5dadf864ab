//! Static-HTML backend: plain HTTP fetch plus CSS-selector queries.
//!
//! Suitable for server-rendered pages and for integration tests; pages that
//! only materialize reviews through client-side scripts need [`ChromeSession`].
//!
//! [`ChromeSession`]: crate::ChromeSession

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::user_agent::get_user_agent;
use crate::{DomError, Node, PageSession};

/// Page session backed by `reqwest` and `scraper`.
///
/// The raw HTML of the current page is kept as a string and parsed inside
/// each query; the parsed document is not `Send` and the session has to
/// live across await points.
pub struct StaticSession {
    http: reqwest::Client,
    current_url: Option<String>,
    html: Option<String>,
}

impl StaticSession {
    pub fn new() -> Result<Self, DomError> {
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            current_url: None,
            html: None,
        })
    }

    fn document(&self) -> Result<Html, DomError> {
        let html = self.html.as_deref().ok_or(DomError::NoPage)?;
        Ok(Html::parse_document(html))
    }

    fn selector(pattern: &str) -> Result<Selector, DomError> {
        Selector::parse(pattern).map_err(|_| DomError::Pattern(pattern.to_string()))
    }
}

/// Joins an element's text nodes with newlines, approximating the rendered
/// `innerText` line structure a browser would produce.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl PageSession for StaticSession {
    async fn load_page(&mut self, url: &str) -> Result<(), DomError> {
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .header("upgrade-insecure-requests", "1")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DomError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }

        self.html = Some(resp.text().await?);
        self.current_url = Some(url.to_string());
        tracing::debug!(url, "page fetched");
        Ok(())
    }

    async fn wait_for_any(
        &mut self,
        patterns: &[&str],
        _timeout: Duration,
    ) -> Result<bool, DomError> {
        // A static page never changes after the fetch, so this is an
        // immediate presence check.
        let doc = self.document()?;
        for pattern in patterns {
            let sel = Self::selector(pattern)?;
            if doc.select(&sel).next().is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn query_elements(&self, pattern: &str) -> Result<Vec<Node>, DomError> {
        let doc = self.document()?;
        let sel = Self::selector(pattern)?;
        Ok(doc
            .select(&sel)
            .map(|el| Node {
                text: element_text(el),
                href: el.value().attr("href").map(str::to_string),
            })
            .collect())
    }

    fn query_nested(
        &self,
        container_pattern: &str,
        child_pattern: &str,
    ) -> Result<Vec<Vec<String>>, DomError> {
        let doc = self.document()?;
        let container_sel = Self::selector(container_pattern)?;
        let child_sel = Self::selector(child_pattern)?;
        Ok(doc
            .select(&container_sel)
            .map(|container| {
                container
                    .select(&child_sel)
                    .map(element_text)
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), DomError> {
        // Nothing to scroll; the whole document arrived with the fetch.
        Ok(())
    }
}
