//! Error types produced while translating query parameters.
//!
//! Translation never panics on user input. Every rejected parameter maps to a
//! [`QueryError`] variant so the HTTP layer can answer with `400 Bad Request`
//! and a message the client can act on.

use thiserror::Error;

/// Validation failures raised by [`crate::translate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// `limit` was present but did not parse as an integer.
    #[error("Limit must be an integer")]
    InvalidLimit(String),

    /// `limit` parsed but fell outside `MIN_LIMIT..=MAX_LIMIT`.
    #[error("Limit must be between {min} and {max}")]
    LimitOutOfRange { value: i128, min: usize, max: usize },

    /// `offset` was present but did not parse as an integer.
    #[error("Offset must be an integer")]
    InvalidOffset(String),

    /// `offset` parsed but was negative.
    #[error("Offset must be >= 0")]
    NegativeOffset(i128),
}

impl QueryError {
    /// The query-string key that caused the failure.
    pub fn parameter(&self) -> &'static str {
        match self {
            QueryError::InvalidLimit(_) | QueryError::LimitOutOfRange { .. } => "limit",
            QueryError::InvalidOffset(_) | QueryError::NegativeOffset(_) => "offset",
        }
    }
}
