use serde::Serialize;
use thiserror::Error;

use eventide_protocol::timeline::{EventModule, EventValidationError};

/// Result type used across the feed crate.
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] EventValidationError),

    #[error("event module `{actual}` does not match source module `{expected}`")]
    ModuleMismatch {
        expected: EventModule,
        actual: EventModule,
    },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl From<FeedError> for eventide_core::EventideError {
    fn from(err: FeedError) -> Self {
        eventide_core::EventideError::TimelineError(err.to_string())
    }
}

/// One source's fetch failure, surfaced on the feed snapshot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceFailure {
    pub module: EventModule,
    pub message: String,
}
