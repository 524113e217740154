//! Time utilities: exam time labels and stored timestamps.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};

/// Canonical form of an exam time label: hours without leading zero,
/// two-digit minutes ("09:00" and "9:00" both become "9:00").
pub fn normalize_time_label(t: &str) -> AppResult<String> {
    let invalid = || AppError::InvalidTime(t.to_string());

    let (h, m) = t.trim().split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let minutes: u32 = m.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(format!("{}:{:02}", hours, minutes))
}

/// Stored timestamps are RFC 3339 strings in UTC.
pub fn to_stamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn parse_stamp(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// Parse an optional `--now` argument, defaulting to the current instant.
pub fn parse_now(input: Option<&str>) -> AppResult<DateTime<Utc>> {
    match input {
        Some(s) => parse_stamp(s),
        None => Ok(Utc::now()),
    }
}
