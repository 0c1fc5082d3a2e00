use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docgate::QueryError;
use serde::{Deserialize, Serialize};
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Unauthorized: invalid or missing API key.")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("{0}")]
    Validation(#[from] QueryError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Document not found")]
    DocumentNotFound,

    #[error("The requested URL was not found.")]
    RouteNotFound,

    #[error("The method is not allowed for the requested URL.")]
    MethodNotAllowed,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Backend failure. Detail is logged under `correlation_id`, never returned.
    #[error("Internal Server Error")]
    Upstream { correlation_id: String },
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    pub correlation_id: String,
}

impl ServerError {
    /// Log a backend failure and return the client-safe error carrying its id.
    pub fn upstream(detail: impl std::fmt::Display) -> Self {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(correlation_id = %correlation_id, error = %detail, "backend failure");
        ServerError::Upstream { correlation_id }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Validation(_)
            | ServerError::InvalidFilter(_)
            | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::DocumentNotFound | ServerError::RouteNotFound => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Unauthorized => "UNAUTHORIZED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::InvalidFilter(_) => "INVALID_FILTER",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::DocumentNotFound | ServerError::RouteNotFound => "NOT_FOUND",
            ServerError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ServerError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ServerError::Upstream { .. } => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let correlation_id = match &self {
            ServerError::Upstream { correlation_id } => correlation_id.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        let body = ErrorResponse {
            status: "error".to_string(),
            code: self.error_code().to_string(),
            message: self.to_string(),
            correlation_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ServerError::DocumentNotFound,
            StoreError::InvalidFilter(msg) => ServerError::InvalidFilter(msg),
            StoreError::InvalidId(id) => ServerError::BadRequest(format!("invalid document id {id:?}")),
            StoreError::Backend(_) => ServerError::upstream(err),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}
