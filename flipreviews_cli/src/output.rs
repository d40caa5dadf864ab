//! Output serialization and the post-crawl summary table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use flipreviews_lib::{CrawlOutcome, ReviewRecord};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Null marker for absent fields in CSV output, distinct from an empty
/// string so downstream consumers can tell "missing" from "blank".
const NULL_MARKER: &str = "NaN";

/// One CSV row; field order fixes the column order.
#[derive(Serialize)]
struct ReviewRow {
    rating: String,
    review_title: String,
    review_text: String,
    date: String,
    location: String,
}

// -- Row builders --

fn build_rows(records: &[ReviewRecord]) -> Vec<ReviewRow> {
    records
        .iter()
        .map(|r| ReviewRow {
            rating: r
                .rating
                .map(|v| v.to_string())
                .unwrap_or_else(|| NULL_MARKER.to_string()),
            review_title: r
                .title
                .clone()
                .unwrap_or_else(|| NULL_MARKER.to_string()),
            review_text: r.body.clone().unwrap_or_else(|| NULL_MARKER.to_string()),
            date: r
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| NULL_MARKER.to_string()),
            location: r
                .location
                .clone()
                .unwrap_or_else(|| NULL_MARKER.to_string()),
        })
        .collect()
}

// -- Writers --

pub fn write_csv<W: Write>(writer: W, records: &[ReviewRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in build_rows(records) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, records: &[ReviewRecord]) -> Result<()> {
    write_csv(File::create(path)?, records)
}

pub fn write_json_file(path: &Path, records: &[ReviewRecord]) -> Result<()> {
    // `ReviewRecord` serializes absent fields as JSON null directly.
    serde_json::to_writer_pretty(File::create(path)?, records)?;
    Ok(())
}

// -- Summary statistics --

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Prints presence counts per field; absent is counted separately from
/// empty, which is why the record keeps `Option` all the way here.
pub fn print_summary(outcome: &CrawlOutcome) {
    let records = &outcome.records;
    let rows = vec![
        StatRow {
            metric: "Total reviews",
            count: records.len(),
        },
        StatRow {
            metric: "With rating",
            count: records.iter().filter(|r| r.rating.is_some()).count(),
        },
        StatRow {
            metric: "With title",
            count: records.iter().filter(|r| r.title.is_some()).count(),
        },
        StatRow {
            metric: "With review text",
            count: records.iter().filter(|r| r.body.is_some()).count(),
        },
        StatRow {
            metric: "With date",
            count: records.iter().filter(|r| r.date.is_some()).count(),
        },
        StatRow {
            metric: "With location",
            count: records.iter().filter(|r| r.location.is_some()).count(),
        },
        StatRow {
            metric: "Duplicates skipped",
            count: outcome.duplicates_skipped,
        },
        StatRow {
            metric: "Pages crawled",
            count: outcome.pages_crawled as usize,
        },
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipreviews_lib::ReviewDate;

    fn sample() -> ReviewRecord {
        ReviewRecord {
            rating: Some(5),
            title: Some("Awesome".to_string()),
            body: Some("Great phone for the price".to_string()),
            date: Some(ReviewDate {
                month: chrono::Month::March,
                year: 2023,
            }),
            location: Some("Pune".to_string()),
        }
    }

    fn csv_string(records: &[ReviewRecord]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_header_fixes_column_order() {
        let csv = csv_string(&[sample()]);
        let header = csv.lines().next().unwrap();
        assert_eq!(header, "rating,review_title,review_text,date,location");
    }

    #[test]
    fn csv_row_carries_all_fields() {
        let csv = csv_string(&[sample()]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "5,Awesome,Great phone for the price,Mar 2023,Pune");
    }

    #[test]
    fn absent_fields_use_the_null_marker() {
        let record = ReviewRecord {
            rating: Some(4),
            ..Default::default()
        };
        let csv = csv_string(&[record]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "4,NaN,NaN,NaN,NaN");
    }

    #[test]
    fn null_marker_differs_from_empty_string() {
        let record = ReviewRecord {
            title: Some(String::new()),
            ..Default::default()
        };
        let csv = csv_string(&[record]);
        let row = csv.lines().nth(1).unwrap();
        // An empty title stays empty; an absent one becomes the marker.
        assert_eq!(row, "NaN,,NaN,NaN,NaN");
    }
}
