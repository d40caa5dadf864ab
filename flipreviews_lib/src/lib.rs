//! Heuristic extraction of product reviews from paginated listing pages.
//!
//! Review listings arrive as noisy, semi-structured text blocks. This crate
//! turns them into [`ReviewRecord`] values: per-field strategy cascades for
//! rating, location, date and title, a noise-removal cleaner for the body
//! text, content-fingerprint deduplication scoped to one crawl session, and
//! a pagination controller with jittered pacing.

pub mod cleaner;
pub mod crawler;
pub mod dedupe;
pub mod error;
pub mod extract;
pub mod record;
pub mod url;

pub use flipreviews_dom;

pub use cleaner::Cleaner;
pub use crawler::{CrawlConfig, CrawlOutcome, Crawler};
pub use dedupe::SeenReviews;
pub use error::CrawlError;
pub use extract::Container;
pub use record::{ReviewDate, ReviewRecord};
