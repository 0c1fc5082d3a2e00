use crate::auth::API_KEY_HEADER;
use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::{MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key gate for protected routes.
///
/// Only `X-API-Key` is consulted. A missing header is treated exactly like a
/// wrong key and the wrapped handler never runs.
pub async fn require_api_key(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let candidate = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.credentials.authorize(candidate) {
        metrics::counter!("docgate_auth_rejections_total").increment(1);
        tracing::warn!(
            path = %request.uri().path(),
            header_present = !candidate.is_empty(),
            "rejected request without a valid API key"
        );
        return Err(ServerError::Unauthorized);
    }

    if !state.check_rate_limit(candidate) {
        return Err(ServerError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Logging middleware, also feeds the request metrics
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    let status_label = status.as_u16().to_string();
    metrics::counter!(
        "docgate_http_requests_total",
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status_label.clone()
    )
    .increment(1);
    metrics::histogram!(
        "docgate_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route,
        "status" => status_label
    )
    .record(duration.as_secs_f64());

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}
