//! Per-field extraction heuristics over one review container.
//!
//! Every extractor takes the container's raw text and returns `Option`:
//! listing markup shifts constantly, so each field is recovered by an
//! ordered cascade of strategies and anything unrecognizable is simply
//! absent. Nothing here can fail a container.

use std::sync::LazyLock;

use chrono::Month;
use regex::Regex;

use crate::record::ReviewDate;

/// The 12 month abbreviations recognized in review dates.
pub(crate) const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Closed vocabulary of canned review titles the listing offers reviewers.
/// Longer phrases come first so the alternation prefers them.
pub(crate) const TITLE_VOCAB: [&str; 26] = [
    "Just wow!",
    "Awesome",
    "Excellent",
    "Great product",
    "Perfect product",
    "Mind-blowing purchase",
    "Worth every penny",
    "Brilliant",
    "Fabulous",
    "Super",
    "Must buy",
    "Terrific purchase",
    "Terrific",
    "Wonderful",
    "Classy product",
    "Best in the market",
    "Simply awesome",
    "Highly recommended",
    "Value-for-money",
    "Good choice",
    "Really Nice",
    "Does the job",
    "Worth the money",
    "Mindblowing purchase",
    "Valueformoney",
    "Nice",
];

pub(crate) fn month_alternation() -> String {
    MONTH_ABBREVS.join("|")
}

pub(crate) fn title_alternation() -> String {
    TITLE_VOCAB.join("|")
}

/// One review's raw text block, as exposed by the page layer.
///
/// `date_hints` carries the texts of date-styled sub-elements gathered by
/// the container extractor; it is the only part of a review the field
/// extractors see beyond the flat text.
#[derive(Debug, Clone)]
pub struct Container {
    pub text: String,
    pub date_hints: Vec<String>,
}

impl Container {
    pub fn new(text: impl Into<String>, date_hints: Vec<String>) -> Self {
        Self {
            text: text.into(),
            date_hints,
        }
    }

    /// Convenience constructor for containers without date-styled children.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

static RATING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^(\d)\s*$",
        r"(\d)\s*★",
        r"(?i)(\d)\s*star",
        r"(?i)(\d)\s*out\s*of\s*5",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Star rating, 1..=5.
///
/// Listings render the rating as a lone digit at the top of the container;
/// the regex cascade covers the star-glyph and "out of 5" variants.
pub fn rating(container: &Container) -> Option<u8> {
    for line in container.text.lines().take(3) {
        let line = line.trim();
        if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(value) = line.parse::<u8>() {
                if (1..=5).contains(&value) {
                    return Some(value);
                }
            }
        }
    }

    for re in RATING_PATTERNS.iter() {
        if let Some(cap) = re.captures(&container.text) {
            if let Ok(value) = cap[1].parse::<u8>() {
                if (1..=5).contains(&value) {
                    return Some(value);
                }
            }
        }
    }

    None
}

static CERTIFIED_BUYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Certified Buyer\s+([A-Za-z\s]+?)(?:\n|$)").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn tidy_location(raw: &str) -> String {
    let no_punct = NON_WORD_RE.replace_all(raw, "");
    WHITESPACE_RE
        .replace_all(&no_punct, " ")
        .trim()
        .to_string()
}

/// Reviewer location, taken from the "Certified Buyer <place>" marker.
pub fn location(container: &Container) -> Option<String> {
    if let Some(cap) = CERTIFIED_BUYER_RE.captures(&container.text) {
        let place = tidy_location(&cap[1]);
        if !place.is_empty() {
            return Some(place);
        }
    }

    for line in container.text.lines() {
        if let Some((_, rest)) = line.split_once("Certified Buyer") {
            let place = tidy_location(rest);
            if place.len() > 2 {
                return Some(place);
            }
        }
    }

    None
}

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({})\s+(20\d{{2}})", month_alternation())).unwrap()
});
static MONTH_COMMA_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({}),\s+(20\d{{2}})", month_alternation())).unwrap()
});
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20\d{2}").unwrap());

fn month_from_abbrev(abbrev: &str) -> Option<Month> {
    let idx = MONTH_ABBREVS.iter().position(|m| *m == abbrev)?;
    Month::try_from(idx as u8 + 1).ok()
}

/// Month + 2000s year co-occurring anywhere in `text`, months in fixed order.
fn month_year_in(text: &str) -> Option<ReviewDate> {
    for (idx, abbrev) in MONTH_ABBREVS.iter().enumerate() {
        if text.contains(abbrev) {
            if let Some(year) = YEAR_RE.find(text) {
                return Some(ReviewDate {
                    month: Month::try_from(idx as u8 + 1).ok()?,
                    year: year.as_str().parse().ok()?,
                });
            }
        }
    }
    None
}

/// Review date as (month abbreviation, 4-digit year).
///
/// Strategies, first hit wins: "Mon 20yy" in the text, "Mon, 20yy" in the
/// text, the date-styled sub-elements, then every line of the text.
pub fn date(container: &Container) -> Option<ReviewDate> {
    for re in [&*MONTH_YEAR_RE, &*MONTH_COMMA_YEAR_RE] {
        if let Some(cap) = re.captures(&container.text) {
            return Some(ReviewDate {
                month: month_from_abbrev(&cap[1])?,
                year: cap[2].parse().ok()?,
            });
        }
    }

    for hint in &container.date_hints {
        if let Some(found) = month_year_in(hint) {
            return Some(found);
        }
    }

    for line in container.text.lines() {
        if let Some(found) = month_year_in(line) {
            return Some(found);
        }
    }

    None
}

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i)({})", title_alternation())).unwrap());

/// Review title, matched against the canned-title vocabulary.
pub fn title(container: &Container) -> Option<String> {
    TITLE_RE
        .captures(&container.text)
        .map(|cap| cap[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_from_leading_digit_line() {
        let c = Container::from_text("5\nAwesome\nGreat phone overall");
        assert_eq!(rating(&c), Some(5));
    }

    #[test]
    fn rating_zero_is_rejected() {
        let c = Container::from_text("0\nsome text");
        assert_eq!(rating(&c), None);
    }

    #[test]
    fn rating_from_star_suffix() {
        let c = Container::from_text("Loved it, giving 4 star without hesitation");
        assert_eq!(rating(&c), Some(4));
    }

    #[test]
    fn rating_from_out_of_five() {
        let c = Container::from_text("Solid 3 out of 5 from me");
        assert_eq!(rating(&c), Some(3));
    }

    #[test]
    fn rating_absent_when_no_digit() {
        let c = Container::from_text("no numbers here at all");
        assert_eq!(rating(&c), None);
    }

    #[test]
    fn rating_digit_beyond_five_is_ignored_in_leading_lines() {
        let c = Container::from_text("9\nstill a fine product");
        assert_eq!(rating(&c), None);
    }

    #[test]
    fn location_from_certified_buyer_marker() {
        let c = Container::from_text("4\nCertified Buyer New Delhi\nGood product");
        assert_eq!(location(&c), Some("New Delhi".to_string()));
    }

    #[test]
    fn location_strips_punctuation_and_collapses_whitespace() {
        let c = Container::from_text("Certified Buyer  Navi   Mumbai\nrest");
        assert_eq!(location(&c), Some("Navi Mumbai".to_string()));
    }

    #[test]
    fn location_absent_without_marker() {
        let c = Container::from_text("5\nGreat screen\nRavi Kumar");
        assert_eq!(location(&c), None);
    }

    #[test]
    fn date_from_month_year() {
        let c = Container::from_text("Reviewed on Mar 2023 by a verified buyer");
        assert_eq!(
            date(&c),
            Some(ReviewDate {
                month: Month::March,
                year: 2023
            })
        );
    }

    #[test]
    fn date_from_month_comma_year() {
        let c = Container::from_text("Posted Oct, 2022");
        assert_eq!(
            date(&c),
            Some(ReviewDate {
                month: Month::October,
                year: 2022
            })
        );
    }

    #[test]
    fn date_from_styled_hint_element() {
        let c = Container::new("no inline date here", vec!["Updated Dec 2021".to_string()]);
        assert_eq!(
            date(&c),
            Some(ReviewDate {
                month: Month::December,
                year: 2021
            })
        );
    }

    #[test]
    fn date_from_line_cooccurrence() {
        let c = Container::from_text("5\nbought in Feb during the 2024 sale\nnice");
        assert_eq!(
            date(&c),
            Some(ReviewDate {
                month: Month::February,
                year: 2024
            })
        );
    }

    #[test]
    fn date_absent_without_month_token() {
        let c = Container::from_text("bought last winter, works fine");
        assert_eq!(date(&c), None);
    }

    #[test]
    fn date_ignores_pre_2000_years() {
        let c = Container::from_text("Mar 1999 classic");
        assert_eq!(date(&c), None);
    }

    #[test]
    fn title_matches_canned_phrase_case_insensitively() {
        let c = Container::from_text("5\nmust BUY\ngreat value");
        assert_eq!(title(&c), Some("must BUY".to_string()));
    }

    #[test]
    fn title_prefers_longer_phrase() {
        let c = Container::from_text("Terrific purchase\nworks well");
        assert_eq!(title(&c), Some("Terrific purchase".to_string()));
    }

    #[test]
    fn title_absent_for_free_text() {
        let c = Container::from_text("the camera bulge is annoying");
        assert_eq!(title(&c), None);
    }
}
