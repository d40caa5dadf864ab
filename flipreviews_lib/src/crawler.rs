//! Pagination controller: drives the page session through the reviews
//! listing and funnels every container through the extraction pipeline.

use std::time::Duration;

use flipreviews_dom::{DomError, PageSession};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::cleaner::Cleaner;
use crate::dedupe::SeenReviews;
use crate::error::CrawlError;
use crate::extract::{self, Container};
use crate::record::ReviewRecord;
use crate::url;

/// Patterns whose appearance means review content has rendered.
const WAIT_PATTERNS: [&str; 4] = [
    "[data-testid='review']",
    "div.col._2wzgFH",
    "div._1AtVbE",
    "div.col",
];

/// Candidate container patterns, most specific first. The first pattern
/// matching more than one element wins; a single match is page noise, not
/// a review list.
const CONTAINER_PATTERNS: [&str; 5] = [
    "[data-testid='review']",
    "div.col._2wzgFH",
    "div._1AtVbE",
    "div.col",
    "div[class*='K0kLPL']",
];

/// Date-styled sub-elements inside a container.
const DATE_HINT_PATTERNS: [&str; 6] = [
    "span[class*='date']",
    "div[class*='date']",
    "span[class*='time']",
    "div[class*='time']",
    "span[class*='_2sc7ZR']",
    "div[class*='_2sc7ZR']",
];

/// Pacing and timeout knobs for one crawl run.
///
/// Environment overrides follow the `FLIPREVIEWS_*` convention; values are
/// milliseconds.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Pages to visit at most. Defaults to 3.
    pub max_pages: u32,
    /// Inter-page delay range in milliseconds; the actual delay is drawn
    /// uniformly from it.
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// How long to wait for review content to render.
    pub content_timeout: Duration,
    /// Settle time after scrolling, for lazily rendered containers.
    pub settle: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            min_delay_ms: 3000,
            max_delay_ms: 6000,
            content_timeout: Duration::from_secs(20),
            settle: Duration::from_secs(3),
        }
    }
}

impl CrawlConfig {
    /// Defaults with `FLIPREVIEWS_*` environment overrides applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_pages: defaults.max_pages,
            min_delay_ms: env_u64("FLIPREVIEWS_DELAY_MIN_MS", defaults.min_delay_ms),
            max_delay_ms: env_u64("FLIPREVIEWS_DELAY_MAX_MS", defaults.max_delay_ms),
            content_timeout: Duration::from_millis(env_u64(
                "FLIPREVIEWS_CONTENT_TIMEOUT_MS",
                defaults.content_timeout.as_millis() as u64,
            )),
            settle: Duration::from_millis(env_u64(
                "FLIPREVIEWS_SETTLE_MS",
                defaults.settle.as_millis() as u64,
            )),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

/// What one crawl run produced.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Accepted records, in page order then container order.
    pub records: Vec<ReviewRecord>,
    /// Pages that yielded at least one container.
    pub pages_crawled: u32,
    /// Reviews discarded as session duplicates.
    pub duplicates_skipped: usize,
    /// Whether the run was cancelled before finishing.
    pub interrupted: bool,
}

/// One crawl run over one reviews listing.
///
/// Owns the page session, the dedup state and the cleaner for its whole
/// lifetime; everything is released when the crawler drops, on every exit
/// path.
pub struct Crawler {
    session: Box<dyn PageSession>,
    config: CrawlConfig,
    cleaner: Cleaner,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new(session: Box<dyn PageSession>, config: CrawlConfig) -> Self {
        Self {
            session,
            config,
            cleaner: Cleaner::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token so the caller can cancel the crawl
    /// (for example from a Ctrl-C handler).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replaces the default body cleaner.
    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Crawls the reviews listing behind `product_url`.
    ///
    /// Page-level failures are logged and treated as empty pages; an empty
    /// first page is transient, an empty later page ends the pagination.
    /// Cancellation stops the run and returns whatever was accumulated.
    pub async fn crawl(mut self, product_url: &str) -> Result<CrawlOutcome, CrawlError> {
        let reviews_url = url::resolve(self.session.as_mut(), product_url).await?;
        tracing::info!(url = %reviews_url, "resolved reviews listing");

        let mut seen = SeenReviews::new();
        let mut records: Vec<ReviewRecord> = Vec::new();
        let mut pages_crawled = 0u32;
        let mut interrupted = false;

        'pages: for page in 1..=self.config.max_pages {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            let page_url = url::page_url(&reviews_url, page);
            let containers = match self.load_containers(&page_url).await {
                Ok(containers) => containers,
                Err(e) => {
                    tracing::warn!(page, error = %e, "page failed, treating as empty");
                    Vec::new()
                }
            };

            if containers.is_empty() {
                if page == 1 {
                    tracing::warn!(page, "no containers on first page, continuing");
                    continue;
                }
                tracing::info!(page, "no containers, reached the end of the listing");
                break;
            }

            pages_crawled += 1;
            let mut accepted = 0usize;
            for container in &containers {
                if self.cancel.is_cancelled() {
                    interrupted = true;
                    break 'pages;
                }
                let record = assemble(container, &self.cleaner);
                if seen.insert(&record) {
                    accepted += 1;
                    records.push(record);
                } else {
                    tracing::debug!(page, "duplicate review skipped");
                }
            }
            tracing::info!(
                page,
                containers = containers.len(),
                accepted,
                total = records.len(),
                "page processed"
            );

            if page < self.config.max_pages {
                if self.pause().await {
                    interrupted = true;
                    break;
                }
            }
        }

        if interrupted {
            tracing::warn!(
                records = records.len(),
                "crawl interrupted, returning accumulated records"
            );
        }

        Ok(CrawlOutcome {
            records,
            pages_crawled,
            duplicates_skipped: seen.duplicates(),
            interrupted,
        })
    }

    async fn load_containers(&mut self, page_url: &str) -> Result<Vec<Container>, DomError> {
        tracing::info!(url = page_url, "loading page");
        self.session.load_page(page_url).await?;

        let appeared = self
            .session
            .wait_for_any(&WAIT_PATTERNS, self.config.content_timeout)
            .await?;
        if !appeared {
            tracing::warn!(url = page_url, "review content did not appear in time");
        }

        if let Err(e) = self.session.scroll_to_bottom() {
            tracing::debug!(error = %e, "scroll failed");
        }
        if !self.config.settle.is_zero() {
            tokio::time::sleep(self.config.settle).await;
        }

        extract_containers(self.session.as_ref())
    }

    /// Jittered inter-page delay. Returns true when cancelled mid-sleep.
    async fn pause(&self) -> bool {
        let span = self.config.min_delay_ms..self.config.max_delay_ms;
        let millis = if span.is_empty() {
            self.config.min_delay_ms
        } else {
            rand::thread_rng().gen_range(span)
        };
        if millis == 0 {
            return self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(millis)) => false,
            _ = self.cancel.cancelled() => true,
        }
    }
}

/// Picks the review containers off the current page.
///
/// Patterns are tried in order; the first one matching more than one
/// element is accepted, and its containers are paired with the texts of
/// their date-styled sub-elements.
pub fn extract_containers(session: &dyn PageSession) -> Result<Vec<Container>, DomError> {
    for pattern in CONTAINER_PATTERNS {
        let nodes = session.query_elements(pattern)?;
        if nodes.len() <= 1 {
            continue;
        }
        tracing::debug!(pattern, count = nodes.len(), "container pattern accepted");

        let mut hints: Vec<Vec<String>> = vec![Vec::new(); nodes.len()];
        for hint_pattern in DATE_HINT_PATTERNS {
            let nested = session.query_nested(pattern, hint_pattern)?;
            for (slot, texts) in hints.iter_mut().zip(nested) {
                slot.extend(texts);
            }
        }

        return Ok(nodes
            .into_iter()
            .zip(hints)
            .map(|(node, date_hints)| Container::new(node.text, date_hints))
            .collect());
    }

    Ok(Vec::new())
}

/// Runs every field extractor over one container.
fn assemble(container: &Container, cleaner: &Cleaner) -> ReviewRecord {
    ReviewRecord {
        rating: extract::rating(container),
        title: extract::title(container),
        body: cleaner.body(container),
        date: extract::date(container),
        location: extract::location(container),
    }
}
