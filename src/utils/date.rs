use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Same as [`parse_date`] but reports the offending input.
pub fn require_date(s: &str) -> AppResult<NaiveDate> {
    parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

/// Human date used in reminder texts: DD.MM.YYYY
pub fn display_date(d: &NaiveDate) -> String {
    d.format("%d.%m.%Y").to_string()
}
