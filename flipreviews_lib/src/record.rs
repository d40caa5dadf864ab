//! Review record types.

use std::fmt;

use chrono::Month;
use serde::{Serialize, Serializer};

/// A month-granularity review date, displayed as `"Mar 2023"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewDate {
    pub month: Month,
    pub year: i32,
}

impl fmt::Display for ReviewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", &self.month.name()[..3], self.year)
    }
}

impl Serialize for ReviewDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One extracted review.
///
/// `None` is the "absent" state: the field could not be recovered from the
/// page. It is distinct from an empty string and is preserved all the way
/// into serialization, where it becomes a null marker.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ReviewRecord {
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub date: Option<ReviewDate>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_displays_as_abbreviation_and_year() {
        let date = ReviewDate {
            month: Month::March,
            year: 2023,
        };
        assert_eq!(date.to_string(), "Mar 2023");
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let record = ReviewRecord {
            rating: Some(5),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["rating"], 5);
        assert!(json["body"].is_null());
        assert!(json["date"].is_null());
    }

    #[test]
    fn date_serializes_as_display_string() {
        let record = ReviewRecord {
            date: Some(ReviewDate {
                month: Month::September,
                year: 2024,
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "Sep 2024");
    }
}
