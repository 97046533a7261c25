use thiserror::Error;

use crate::types::JobId;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Creation invoked with an identity that already resolves to a record.
    /// Callers wanting to change a schedule must remove and re-create.
    #[error("Job {id} already exists")]
    JobAlreadyExists { id: JobId },

    /// No job with the given ID exists in the store.
    #[error("Job not found: {id}")]
    JobNotFound { id: JobId },

    /// A job without an assigned identity was used where one is required.
    #[error("Job has no identity; it must be persisted first")]
    Unidentified,

    /// One schedule field does not parse under the calendar grammar.
    #[error("Invalid schedule field {field}: {value:?}")]
    InvalidScheduleField { field: &'static str, value: String },

    /// The combined schedule expression is invalid or unsupported.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// The opaque timer handle could not be encoded or decoded.
    #[error("Timer handle serialization error: {0}")]
    HandleCodec(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
