//! Calendar-date normalization.
//!
//! Schedule dates are stored as `YYYY-MM-DD` strings with no time-of-day.
//! Inputs may arrive as a plain date, a full timestamp, or empty; empty
//! and null both mean "unset".

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{Error, Result};

fn date_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The date must stand alone or be followed by a time separator;
    // "2024-03-15xyz" is not a date.
    RE.get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[T ]|$)").expect("valid regex"))
}

/// Reduce a date input to its `YYYY-MM-DD` form, if it has one.
///
/// Accepts a bare calendar date, an RFC 3339 timestamp, or a
/// `YYYY-MM-DD HH:MM:SS` timestamp. Whitespace-only input is "unset".
pub fn normalize_date(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(caps) = date_prefix().captures(input) {
        let prefix = &caps[1];
        // The prefix must be a real calendar date, not just date-shaped.
        if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() {
            return Some(prefix.to_string());
        }
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date().format("%Y-%m-%d").to_string());
    }

    None
}

/// Normalize an optional date field, rejecting malformed non-empty input.
///
/// `None` and `Some("")` both produce `Ok(None)`; garbage that cannot be
/// read as a date at all is a validation failure naming the field.
pub fn normalize_date_field(field: &'static str, input: Option<&str>) -> Result<Option<String>> {
    match input {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            normalize_date(trimmed)
                .map(Some)
                .ok_or_else(|| Error::validation(field, format!("not a date: {trimmed:?}")))
        }
    }
}
