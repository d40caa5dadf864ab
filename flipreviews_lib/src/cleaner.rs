//! Body extraction and noise removal.
//!
//! Review containers interleave the body text with ratings, canned titles,
//! reviewer names, locations and vote counts, and the listing appends the
//! reviewer's identity straight onto the body text itself. The cleaner runs
//! three passes: a skip-line filter over the container, a trailing-pattern
//! cascade over the joined text, and a trailing-word heuristic for whatever
//! the cascade missed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{month_alternation, title_alternation, Container};

/// Minimum body length after cleaning; anything shorter becomes absent.
const MIN_BODY_LEN: usize = 8;

/// Lines shorter than this carry no body content (stray digits, glyphs).
const MIN_LINE_LEN: usize = 4;

/// Lines dropped before the body is assembled, tried in order.
static SKIP_LINE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d$".to_string(),
        r"(?i)^Certified Buyer".to_string(),
        format!(r"(?i)^({})\s+20\d{{2}}$", month_alternation()),
        format!(r"(?i)^({})$", month_alternation()),
        r"(?i)^\d+\s*helpful".to_string(),
        format!(r"(?i)^({})$", title_alternation()),
        r"^\d+\s*$".to_string(),
        r"^[A-Z][a-z]+\s+[A-Z][a-z]+\s*$".to_string(),
        r"^[A-Z][A-Z]+\s+[A-Z][A-Z]+\s*$".to_string(),
        r"^[A-Z][a-z]+\s*$".to_string(),
        r"(?i)^Customer\s*$".to_string(),
        r"(?i)^Flipkart\s+Customer\s*$".to_string(),
        r"^[A-Z][a-z]+\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s*$".to_string(),
        r"^[A-Z]{2,}\s+[A-Z]{2,}\s+[A-Z]{2,}\s*$".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Trailing token groups resembling an appended reviewer identity or
/// metadata suffix. Each rule is applied once, in order; a residual name
/// uncovered by a later rule is left to the trailing-word heuristic.
static TRAILING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let months = month_alternation();
    [
        // Initials ("Ajin V") and parenthetical aliases ("Talim (sk)").
        r"\s+[A-Z][a-z]+\s+[A-Z]\s*$".to_string(),
        r"\s+[A-Z][a-z]+\s*\([a-z]+\)\s*$".to_string(),
        // Three-word names, mixed case and all caps.
        r"\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s*$".to_string(),
        r"\s+[A-Z]{2,}\s+[A-Z]{2,}\s+[A-Z]{2,}\s*$".to_string(),
        r"\s+[A-Z][a-z]+\s+[A-Z]{2,}\s+[A-Z][a-z]+\s*$".to_string(),
        // Two-word names.
        r"\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s*$".to_string(),
        r"\s+[A-Z]{2,}\s+[A-Z]{2,}\s*$".to_string(),
        // Names followed by a month abbreviation.
        format!(r"\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s+({months})\s*$"),
        format!(r"\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s+({months})\s*$"),
        // Customer suffixes.
        r"\s+Flipkart\s+Customer\s*$".to_string(),
        r"\s+[A-Z][a-z]+\s+Customer\s*$".to_string(),
        r"\s+Customer\s*$".to_string(),
        // Relative timestamps.
        r"\s+\d+\s*months?\s*ago\s*$".to_string(),
        r"\s+\d+\s*days?\s*ago\s*$".to_string(),
        r"\s+\d+\s*hours?\s*ago\s*$".to_string(),
        // Trailing dates and bare numbers.
        format!(r"\s+({months})\s+20\d{{2}}\s*$"),
        format!(r"\s+({months})\s*$"),
        r"\s+\d+\s*$".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TRAILING_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,.\s]+$").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Words never removed by the trailing-word heuristic: common sentiment
/// and product-domain vocabulary that legitimately ends a review.
const DEFAULT_KEEP_WORDS: [&str; 28] = [
    "Good",
    "Nice",
    "Great",
    "Best",
    "Super",
    "Awesome",
    "Perfect",
    "Amazing",
    "Excellent",
    "Phone",
    "Camera",
    "Battery",
    "Product",
    "Quality",
    "Performance",
    "Display",
    "Design",
    "Experience",
    "Service",
    "Delivery",
    "Apple",
    "iPhone",
    "Flipkart",
    "Thanks",
    "Thank",
    "Love",
    "Loved",
    "Happy",
];

/// Body-text cleaner with a configurable retention vocabulary.
#[derive(Debug, Clone)]
pub struct Cleaner {
    keep_words: HashSet<String>,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self {
            keep_words: DEFAULT_KEEP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Cleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the retention vocabulary. The trailing-word heuristic is
    /// known to eat legitimate closing words; callers scraping a different
    /// product domain should supply their own list.
    pub fn with_keep_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keep_words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Extracts the cleaned review body from a container, or absent if
    /// nothing body-like survives cleaning.
    pub fn body(&self, container: &Container) -> Option<String> {
        let kept: Vec<&str> = container
            .text
            .lines()
            .map(str::trim)
            .filter(|line| line.len() >= MIN_LINE_LEN && !is_skip_line(line))
            .collect();
        if kept.is_empty() {
            return None;
        }

        let cleaned = self.clean(&kept.join(" "));
        if cleaned.len() < MIN_BODY_LEN {
            None
        } else {
            Some(cleaned)
        }
    }

    /// Runs the trailing cascade and trailing-word heuristic over already
    /// assembled body text.
    pub fn clean(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in TRAILING_PATTERNS.iter() {
            out = re.replace(&out, "").into_owned();
        }
        out = TRAILING_PUNCT_RE.replace(&out, "").into_owned();
        out = WHITESPACE_RE.replace_all(&out, " ").trim().to_string();
        self.trim_trailing_name(out)
    }

    /// Removes a trailing span of 3, 2 or 1 Title-cased words unless the
    /// span is in the retention vocabulary. Only the first qualifying span
    /// length is removed.
    fn trim_trailing_name(&self, text: String) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= 1 {
            return text;
        }
        for span in (1..=words.len().min(3)).rev() {
            let tail = &words[words.len() - span..];
            let joined = tail.join(" ");
            if tail.iter().all(|w| is_title_cased(w))
                && joined.len() > 2
                && !self.keep_words.contains(&joined)
            {
                return words[..words.len() - span].join(" ");
            }
        }
        text
    }
}

fn is_skip_line(line: &str) -> bool {
    SKIP_LINE_PATTERNS.iter().any(|re| re.is_match(line))
}

fn is_title_cased(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            word.chars().all(char::is_alphabetic) && chars.all(char::is_lowercase)
        }
        _ => false,
    }
}
