//! Session-scoped duplicate detection by content fingerprint.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::record::ReviewRecord;

/// Hex digest over the lower-cased concatenation of title, body and rating,
/// with `"nan"` standing in for absent fields. Collision resistance is all
/// that matters here, not secrecy.
pub fn fingerprint(record: &ReviewRecord) -> String {
    let title = record.title.as_deref().unwrap_or("nan");
    let body = record.body.as_deref().unwrap_or("nan");
    let rating = record
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "nan".to_string());

    let content = format!("{title}{body}{rating}").to_lowercase();
    let digest = Sha256::digest(content.trim().as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// The set of review fingerprints one crawl session has already emitted.
///
/// Owned by the crawl run and dropped with it; duplicate state never
/// crosses session boundaries.
#[derive(Debug, Default)]
pub struct SeenReviews {
    seen: HashSet<String>,
    duplicates: usize,
}

impl SeenReviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the review's fingerprint. Returns `false` (and counts the
    /// duplicate) if an identical review was already seen this session.
    pub fn insert(&mut self, record: &ReviewRecord) -> bool {
        if self.seen.insert(fingerprint(record)) {
            true
        } else {
            self.duplicates += 1;
            false
        }
    }

    /// Number of duplicate reviews discarded so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of distinct reviews seen so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
