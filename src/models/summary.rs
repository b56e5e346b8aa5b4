use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const HIGHLIGHTS_DELIMITER: &str = "**Highlights:**";

static HIGHLIGHTS_RE: OnceLock<Regex> = OnceLock::new();

fn highlights_re() -> &'static Regex {
    // Three numbered highlight sentences after the delimiter; dot-all so a
    // highlight may wrap onto a following line.
    HIGHLIGHTS_RE.get_or_init(|| Regex::new(r"(?s)1\.(.*?)\n2\.(.*?)\n3\.(.*?)\.").unwrap())
}

/// Cache key for one monthly summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub month: u32,
    pub year: i32,
}

impl MonthKey {
    pub fn new(month: u32, year: i32) -> Result<Self, ValidationError> {
        if (1..=12).contains(&month) {
            Ok(MonthKey { month, year })
        } else {
            Err(ValidationError::BadMonth(month))
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.contains(today)
    }
}

/// Stored monthly summary row. `average_rating` is absent on legacy rows and
/// backfilled lazily on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSummary {
    pub month: u32,
    pub year: i32,
    pub raw_text: String,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

/// Structured form of a summary that passed the format contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSummary {
    pub narrative: String,
    pub highlights: [String; 3],
}

/// Checks the fixed model-output contract: narrative text, the literal
/// `**Highlights:**` delimiter, then three numbered highlight sentences.
/// Returns `None` when the text does not match; callers treat that as cache
/// corruption or a bad completion, never as a panic.
pub fn parse_summary(raw: &str) -> Option<ParsedSummary> {
    let delim = raw.find(HIGHLIGHTS_DELIMITER)?;
    let narrative = raw[..delim].trim().to_string();
    let tail = &raw[delim + HIGHLIGHTS_DELIMITER.len()..];
    let caps = highlights_re().captures(tail)?;
    Some(ParsedSummary {
        narrative,
        highlights: [
            caps[1].trim().to_string(),
            caps[2].trim().to_string(),
            caps[3].trim().to_string(),
        ],
    })
}
