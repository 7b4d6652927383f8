//! Calendar-date parsing with date-only semantics.
//!
//! Stored dates such as `2024-03-01` always mean March 1st, whatever the
//! local time zone. Timestamps are reduced to their date prefix verbatim and
//! are never shifted through UTC.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error returned when a calendar date cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// Input was empty or whitespace.
    #[error("Date is empty")]
    Empty,

    /// Input is not a valid `YYYY-MM-DD` calendar date.
    #[error("Invalid calendar date: {0}")]
    Invalid(String),
}

/// Parses an ISO calendar date (`YYYY-MM-DD`) as a local date.
///
/// Accepts full ISO timestamps (`2024-03-01T23:30:00Z`) by taking the date
/// part as written.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    let date_part = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(date, _)| date);

    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| DateParseError::Invalid(input.to_string()))
}

/// Serde adapter for required calendar-date fields.
///
/// Use with `#[serde(deserialize_with = "calendar_date::deserialize")]`.
pub mod calendar_date {
    use super::{Deserialize, Deserializer, NaiveDate, parse_calendar_date};

    /// Deserializes a calendar date from a string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }

    /// Serde adapter for optional calendar-date fields.
    ///
    /// Missing fields, `null`, and empty strings all map to `None`.
    pub mod option {
        use super::{Deserialize, Deserializer, NaiveDate, parse_calendar_date};

        /// Deserializes an optional calendar date from a string.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) => parse_calendar_date(value)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
            }
        }
    }
}
