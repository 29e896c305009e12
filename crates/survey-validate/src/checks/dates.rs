//! Observation date and time format checks.

use chrono::{DateTime, NaiveDate};
use survey_model::ObservationRow;

use crate::issue::{INVALID_TIME_MARKER, Issue};

pub fn check(row: &ObservationRow) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(date) = row.observation_date.as_deref()
        && !date.trim().is_empty()
        && !is_valid_date(date)
    {
        issues.push(Issue::InvalidDate {
            value: date.trim().to_string(),
        });
    }

    if let Some(time) = row.observation_time.as_deref()
        && is_invalid_time_marker(time)
    {
        issues.push(Issue::InvalidTime);
    }

    issues
}

/// Calendar date (`YYYY-MM-DD`) or a full RFC 3339 timestamp.
pub fn is_valid_date(value: &str) -> bool {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(trimmed).is_ok()
}

pub fn is_invalid_time_marker(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(INVALID_TIME_MARKER)
}
