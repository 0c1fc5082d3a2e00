use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`crate::DocumentStore`].
///
/// `NotFound`, `InvalidFilter` and `InvalidId` describe the caller's request and
/// are safe to show to clients. `Backend` carries internal detail and must only
/// be logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("{0}")]
    InvalidFilter(String),

    #[error("invalid document id: {0:?}")]
    InvalidId(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn backend<S: Into<String>>(msg: S) -> Self {
        StoreError::Backend(msg.into())
    }
}
