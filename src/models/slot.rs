use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// An (event, campus, date, time) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub event_id: i64,
    pub campus: String,
    pub date: NaiveDate,
    pub time: String,
}

impl Cell {
    /// Campus names are matched without surrounding whitespace, both when
    /// counting and when looking the campus up in the event.
    pub fn new(event_id: i64, campus: &str, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            event_id,
            campus: campus.trim().to_string(),
            date,
            time: time.into(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} (event {})",
            self.campus,
            self.date.format("%Y-%m-%d"),
            self.time,
            self.event_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub time: String,
    pub booked: u32,
    pub capacity: u32,
    pub available: u32,
}

impl SlotAvailability {
    pub fn new(time: String, booked: u32, capacity: u32) -> Self {
        Self {
            time,
            booked,
            capacity,
            available: capacity.saturating_sub(booked),
        }
    }
}
