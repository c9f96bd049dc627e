//! Error types for the timetable engine.

use crate::resolution::WorkflowError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors raised while building or mutating schedule records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    /// Time string is not a valid `HH:MM` wall-clock time
    #[error("invalid time format: {value:?} (expected HH:MM)")]
    InvalidTimeFormat { value: String },

    /// Start time is not strictly before end time
    #[error("start time {start} must be before end time {end}")]
    InvalidTimeRange { start: String, end: String },

    /// Day is not one of Monday..Saturday
    #[error("invalid day: {value:?}")]
    InvalidDay { value: String },

    /// Exam date is not an ISO `YYYY-MM-DD` date
    #[error("invalid date: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Resolution step called out of order
    #[error(transparent)]
    BadState(#[from] WorkflowError),
}

impl ScheduleError {
    /// Stable error code reported over IPC.
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::InvalidTimeFormat { .. } => "invalid_time_format",
            ScheduleError::InvalidTimeRange { .. } => "invalid_time_range",
            ScheduleError::InvalidDay { .. } => "invalid_day",
            ScheduleError::InvalidDate { .. } => "invalid_date",
            ScheduleError::NotFound { .. } => "not_found",
            ScheduleError::DuplicateId { .. } => "duplicate_id",
            ScheduleError::InvalidInput(_) => "bad_params",
            ScheduleError::BadState(_) => "bad_state",
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ScheduleError::NotFound {
            kind,
            id: id.into(),
        }
    }
}
