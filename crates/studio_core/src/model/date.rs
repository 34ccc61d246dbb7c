//! Calendar-date parsing and wire encoding.
//!
//! # Responsibility
//! - Parse the `YYYY-MM-DD` interchange encoding into `NaiveDate`.
//! - Provide serde adapters that keep that exact encoding on the wire.
//!
//! # Invariants
//! - Dates carry no time-of-day; two dates are equal iff same y/m/d.
//! - Malformed input is rejected, never guessed or normalized.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire format for calendar dates.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

static CALENDAR_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid calendar date regex"));

/// Date parse failures surfaced to callers as invalid arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    Empty,
    Malformed(String),
    OutOfRange(String),
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "calendar date must not be empty"),
            Self::Malformed(value) => {
                write!(f, "calendar date `{value}` is not in YYYY-MM-DD form")
            }
            Self::OutOfRange(value) => write!(f, "calendar date `{value}` does not exist"),
        }
    }
}

impl Error for DateParseError {}

/// Parses one `YYYY-MM-DD` calendar date.
///
/// Surrounding whitespace is ignored; anything else that deviates from the
/// zero-padded form (`2024-3-4`, `2024-03-04T00:00`) is rejected.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }
    if !CALENDAR_DATE_RE.is_match(trimmed) {
        return Err(DateParseError::Malformed(trimmed.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, CALENDAR_DATE_FORMAT)
        .map_err(|_| DateParseError::OutOfRange(trimmed.to_string()))
}

/// Formats a date with the wire encoding.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(CALENDAR_DATE_FORMAT).to_string()
}

/// Serde adapter for required `YYYY-MM-DD` fields.
pub mod serde_date {
    use super::{format_calendar_date, parse_calendar_date};
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_calendar_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_calendar_date(&raw).map_err(de::Error::custom)
    }
}

/// Serde adapter for optional `YYYY-MM-DD` fields.
///
/// `null`, a missing field and an empty string all decode to `None`.
pub mod serde_date_opt {
    use super::{format_calendar_date, parse_calendar_date};
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(value) => serializer.serialize_some(&format_calendar_date(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(value) if !value.trim().is_empty() => parse_calendar_date(&value)
                .map(Some)
                .map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}
