//! Unified application error type.
//! Every module (db, core, cli, directory) returns AppError so the reservation
//! outcomes stay distinguishable all the way up to the CLI.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Reservation outcomes
    // ---------------------------
    #[error("No trial exam is currently open for registration")]
    NoActiveEvent,

    #[error("Slot not offered by the active event: {0}")]
    InvalidSlot(String),

    #[error("Reservation limit reached: at most {0} exams per student")]
    QuotaExceeded(u32),

    #[error("You are already registered for this exam")]
    DuplicateReservation,

    #[error("No free seats left for {0}")]
    SlotFull(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ---------------------------
    // Catalog errors
    // ---------------------------
    #[error("{0} existing reservation(s) would be orphaned by this change")]
    OrphanedReservations(usize),

    #[error("Invalid event definition: {0}")]
    InvalidEvent(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time label: {0}")]
    InvalidTime(String),

    #[error("Subject not available for this student: {0}")]
    InvalidSubject(String),

    #[error("Invalid student record: {0}")]
    InvalidStudent(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(e.to_string())
    }
}

impl AppError {
    /// True for the expected outcomes of a reservation request, as opposed to
    /// storage or configuration failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::NoActiveEvent
                | AppError::InvalidSlot(_)
                | AppError::QuotaExceeded(_)
                | AppError::DuplicateReservation
                | AppError::SlotFull(_)
                | AppError::NotFound(_)
        )
    }

    /// Stable machine-readable code, used by `--json` output.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NoActiveEvent => "no_active_event",
            AppError::InvalidSlot(_) => "invalid_slot",
            AppError::QuotaExceeded(_) => "quota_exceeded",
            AppError::DuplicateReservation => "duplicate_reservation",
            AppError::SlotFull(_) => "slot_full",
            AppError::NotFound(_) => "not_found",
            AppError::OrphanedReservations(_) => "orphaned_reservations",
            AppError::InvalidEvent(_) => "invalid_event",
            AppError::InvalidSubject(_) => "invalid_subject",
            AppError::InvalidStudent(_) => "invalid_student",
            AppError::InvalidDate(_) | AppError::InvalidTime(_) => "invalid_input",
            _ => "internal",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
