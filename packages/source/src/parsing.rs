//! Date parsing helpers for Socrata payloads and CLI input.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses a Socrata floating timestamp (ISO 8601 with optional fractional
/// seconds, no offset).
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive);
    }
    None
}

/// Parses a user-supplied start date, accepting either a full Socrata
/// timestamp or a bare `YYYY-MM-DD` date (taken as midnight).
#[must_use]
pub fn parse_start_date(s: &str) -> Option<NaiveDateTime> {
    parse_socrata_date(s).or_else(|| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Formats a timestamp the way Socrata's `$where` clauses expect it.
#[must_use]
pub fn format_socrata_date(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}
