//! API route handlers
//!
//! - `health`: liveness, readiness and metrics
//! - `documents`: single-collection CRUD and filtered listing
//! - `collections`: nested-collection queries

pub mod collections;
pub mod documents;
pub mod health;

use crate::error::ServerError;
use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

/// Service information, `GET /`. No authentication.
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "name": "docgate",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/documents/{collection}",
            "/documents/{collection}/{id}",
            "/collections/{collection}/subcollections/{subcollection}",
            "/health",
            "/ready",
            "/metrics"
        ]
    }))
}

/// 404 for undefined routes
pub async fn not_found() -> ServerError {
    ServerError::RouteNotFound
}

/// 405 for a known path with an unsupported method
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}
