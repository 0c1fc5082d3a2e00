use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Pin the start time. Called at startup so uptime counts from process start.
pub fn record_start_time() -> SystemTime {
    *once_cell::sync::Lazy::force(&SERVER_START_TIME)
}

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Liveness: 200 while the process is serving
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "state": "healthy",
        "service": "docgate",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness: credentials loaded and the store answers a ping
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> Response {
    let store_status = match state.store.ping().await {
        Ok(()) => "ready",
        Err(err) => {
            tracing::warn!(error = %err, "document store ping failed");
            "unavailable"
        }
    };
    let ready = store_status == "ready" && !state.credentials.is_empty();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = Json(json!({
        "status": if ready { "success" } else { "error" },
        "state": if ready { "ready" } else { "not_ready" },
        "service": "docgate",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": store_status,
            "api_keys": state.credentials.len(),
        }
    }));

    (status, body).into_response()
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let handle = state.metrics.as_ref().ok_or_else(|| {
        ServerError::ServiceUnavailable("metrics exporter is not installed".to_string())
    })?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_time_is_fixed_once_recorded() {
        let first = record_start_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(record_start_time(), first);
        assert!(first <= SystemTime::now());
    }
}
