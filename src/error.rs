//! Error taxonomy shared by the parser, store and engine

use thiserror::Error;

use crate::state::TimerId;

/// Everything a queue command or the store can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Duration text could not be parsed
    #[error("invalid duration format: {0:?} (expected H:MM, MM or HMM)")]
    InvalidFormat(String),
    /// Duration parsed (or was given) as zero seconds
    #[error("duration must be greater than zero")]
    InvalidDuration,
    /// Command is not legal in the current queue state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("no timer with id {0}")]
    NotFound(TimerId),
    /// I/O or encoding failure while loading or saving the snapshot
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl QueueError {
    pub(crate) fn invalid_op(reason: impl Into<String>) -> Self {
        Self::InvalidOperation(reason.into())
    }

    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::InvalidDuration => "invalid_duration",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::NotFound(_) => "not_found",
            Self::Persistence(_) => "persistence_failure",
        }
    }
}

impl From<std::io::Error> for QueueError {
    fn from(value: std::io::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(value: serde_json::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}
