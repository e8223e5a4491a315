//! Error types for the daybook library.
//!
//! Every failure the engine or the state machine can produce is returned to
//! the immediate caller; nothing is swallowed or retried inside the library.

use chrono::NaiveDate;
use thiserror::Error;

use crate::prayer::{GatedField, Window, WindowStatus};

/// Errors surfaced by the state machine and the summaries.
#[derive(Error, Debug)]
pub enum DaybookError {
    /// A gated toggle was attempted outside its window with travel mode off.
    #[error("{field} can only be checked between {window} ({status})")]
    IneligibleWindow {
        field: GatedField,
        window: Window,
        status: WindowStatus,
    },

    /// Prayer instants could not be produced for the day being checked.
    #[error("Prayer time computation failed: {0}")]
    Computation(#[from] ComputationError),

    /// The store failed or timed out; in-memory state was left untouched.
    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    /// A daily log id that does not exist.
    #[error("Daily log {0} not found")]
    NotFound(i64),

    /// A payload for an ungated field failed validation.
    #[error("Invalid entry: {0}")]
    InvalidPayload(#[from] PayloadError),
}

impl From<StoreError> for DaybookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DaybookError::NotFound(id),
            other => DaybookError::Persistence(other),
        }
    }
}

/// Failures of the astronomical calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The sun never reaches the altitude an event needs (polar day/night, white nights).
    #[error("sun never reaches {altitude:.2}° on {date} for {event}")]
    SunNeverReaches {
        event: &'static str,
        altitude: f64,
        date: NaiveDate,
    },

    #[error("{event} computed for {date} falls on {actual}")]
    OutsideDay {
        event: &'static str,
        date: NaiveDate,
        actual: NaiveDate,
    },

    #[error("computed instants for {date} are not strictly increasing ({detail})")]
    NonMonotonic { date: NaiveDate, detail: String },

    #[error("{event} on {date} has no unambiguous local time")]
    AmbiguousLocalTime { event: &'static str, date: NaiveDate },
}

/// Store collaborator failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record for this (user, date) already exists.
    #[error("daily log for {user_id} on {date} already exists")]
    Conflict { user_id: String, date: NaiveDate },

    #[error("record {0} not found")]
    NotFound(i64),

    /// A stored row could not be read back into a record.
    #[error("record {id} is malformed: {detail}")]
    Corrupt { id: i64, detail: String },
}

/// Validation failures for ungated payloads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("exercise type is required")]
    MissingExerciseType,

    #[error("exercise duration must be at least one minute")]
    ZeroDuration,

    #[error("reading text is required")]
    MissingReadingText,

    #[error("select at least one language")]
    NoLanguages,

    #[error("select which tool was used")]
    MissingTool,

    #[error("presence must be between {min} and {max} (got {got})")]
    PresenceOutOfRange { got: u8, min: u8, max: u8 },
}

pub type Result<T> = std::result::Result<T, DaybookError>;
