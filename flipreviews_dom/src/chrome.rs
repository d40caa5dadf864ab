//! Headless-Chrome backend for JavaScript-rendered review pages.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use crate::user_agent::get_user_agent;
use crate::{DomError, Node, PageSession};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Page session backed by a headless Chrome process.
///
/// The browser is owned by the session and shut down when it drops, so a
/// crawl releases the process on every exit path.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn new() -> Result<Self, DomError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-gpu"),
            ])
            .build()
            .map_err(|e| DomError::Session(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| DomError::Session(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| DomError::Session(e.to_string()))?;
        tab.set_user_agent(get_user_agent(), Some("en-US,en;q=0.9"), None)
            .map_err(|e| DomError::Session(e.to_string()))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Best-effort scoped query: CDP errors on transient pages are treated
    /// as "nothing matched", matching the contract of the capability trait.
    fn elements(&self, pattern: &str) -> Vec<Element<'_>> {
        match self.tab.find_elements(pattern) {
            Ok(elements) => elements,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "element query failed");
                Vec::new()
            }
        }
    }
}

fn attr_value(element: &Element<'_>, name: &str) -> Option<String> {
    let attrs = element.get_attributes().ok()??;
    attrs
        .chunks_exact(2)
        .find(|pair| pair[0] == name)
        .map(|pair| pair[1].clone())
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn load_page(&mut self, url: &str) -> Result<(), DomError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| DomError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(url, "page loaded");
        Ok(())
    }

    async fn wait_for_any(
        &mut self,
        patterns: &[&str],
        timeout: Duration,
    ) -> Result<bool, DomError> {
        let deadline = Instant::now() + timeout;
        loop {
            for pattern in patterns {
                if !self.elements(pattern).is_empty() {
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn query_elements(&self, pattern: &str) -> Result<Vec<Node>, DomError> {
        Ok(self
            .elements(pattern)
            .iter()
            .map(|el| Node {
                text: el.get_inner_text().unwrap_or_default(),
                href: attr_value(el, "href"),
            })
            .collect())
    }

    fn query_nested(
        &self,
        container_pattern: &str,
        child_pattern: &str,
    ) -> Result<Vec<Vec<String>>, DomError> {
        Ok(self
            .elements(container_pattern)
            .iter()
            .map(|container| {
                container
                    .find_elements(child_pattern)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|child| child.get_inner_text().ok())
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), DomError> {
        self.tab
            .evaluate("window.scrollTo(0, document.body.scrollHeight);", false)
            .map_err(|e| DomError::Eval(e.to_string()))?;
        Ok(())
    }
}
