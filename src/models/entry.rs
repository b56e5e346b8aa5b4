use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Day rating on a 1-10 scale, with 11 as the "no rating given" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const UNRATED: Rating = Rating(11);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=11).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    /// Normalizes the editor's slider state: a gray/unset slider carries no
    /// number and becomes the sentinel.
    pub fn from_slider(value: Option<u8>) -> Result<Self, ValidationError> {
        match value {
            None => Ok(Rating::UNRATED),
            Some(n) if (1..=10).contains(&n) => Ok(Rating(n)),
            Some(n) => Err(ValidationError::RatingOutOfRange(n)),
        }
    }

    pub fn is_unrated(self) -> bool {
        self == Rating::UNRATED
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Index into the rating color gradient.
    pub fn color_index(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unrated() {
            f.write_str("x")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Sparse per-entry tracker values, keyed by tracker name.
pub type TrackerValues = BTreeMap<String, TrackerValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackerValue {
    Flag(bool),
    Text(String),
}

impl TrackerValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            TrackerValue::Flag(b) => Some(*b),
            TrackerValue::Text(_) => None,
        }
    }
}

/// One journal record for one calendar day; `date` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub date: NaiveDate,
    pub rating: Rating,
    pub text: String,
    #[serde(default)]
    pub trackers: TrackerValues,
    #[serde(default)]
    pub starred: bool,
}
