use super::slot::Cell;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub subject: String,
    pub campus: String,
    pub exam_date: NaiveDate, // ⇔ reservations.exam_date (TEXT "YYYY-MM-DD")
    pub exam_time: String,    // ⇔ reservations.exam_time (canonical "H:MM")
    pub created_at: DateTime<Utc>,
    pub confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub attended: bool,
    pub submitted_work: bool,
}

/// Pre-exam phase of a reservation. Attendance and submitted work are
/// separate flags, not states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationState {
    Registered,
    Confirmed,
}

impl ReservationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Registered => "registered",
            ReservationState::Confirmed => "confirmed",
        }
    }
}

impl Reservation {
    pub fn state(&self) -> ReservationState {
        if self.confirmed {
            ReservationState::Confirmed
        } else {
            ReservationState::Registered
        }
    }

    pub fn cell(&self) -> Cell {
        Cell {
            event_id: self.event_id,
            campus: self.campus.clone(),
            date: self.exam_date,
            time: self.exam_time.clone(),
        }
    }

    pub fn date_str(&self) -> String {
        self.exam_date.format("%Y-%m-%d").to_string()
    }
}

/// A student's request for a seat in the active event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub student_id: i64,
    pub subject: String,
    pub campus: String,
    pub date: NaiveDate,
    pub time: String,
}

impl ReservationRequest {
    pub fn new(
        student_id: i64,
        subject: impl Into<String>,
        campus: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
    ) -> Self {
        Self {
            student_id,
            subject: subject.into(),
            campus: campus.into(),
            date,
            time: time.into(),
        }
    }
}

/// Operator-set exam outcome; `None` leaves the flag as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub attended: Option<bool>,
    pub submitted_work: Option<bool>,
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        self.attended.is_none() && self.submitted_work.is_none()
    }
}
