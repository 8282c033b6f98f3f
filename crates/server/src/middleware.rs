use crate::error::ServerError;
use crate::negotiate::{query_map, Format};
use crate::state::{RateLimitDecision, ServerState};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::sync::Arc;

/// Path excluded from request counting
pub const FAVICON_PATH: &str = "/favicon.ico";

pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// Window end as Unix epoch milliseconds
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Client key for rate limiting: the forwarded-for chain, else the peer address
pub fn client_key(request: &Request) -> String {
    let forwarded: Vec<&str> = request
        .headers()
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if !forwarded.is_empty() {
        return forwarded.join(",");
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Response format a failing middleware should answer in
fn request_format(request: &Request) -> Format {
    Format::from_request(request.headers(), &query_map(request.uri()))
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let reset_at = chrono::Utc::now().timestamp_millis()
        + i64::try_from(decision.reset_after.as_millis()).unwrap_or(i64::MAX);
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(reset_at));
}

/// Per-client fixed-window rate limiting
pub async fn rate_limit(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let decision = state.check_rate_limit(&key);
    if !decision.is_enforced() {
        return next.run(request).await;
    }

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::debug!(client = %key, "Rate limit exceeded");
        // Always an envelope so clients can read the retry message
        let mut response = ServerError::RateLimitExceeded.into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(decision.retry_after_secs()));
        response
    };
    insert_rate_limit_headers(response.headers_mut(), &decision);
    response
}

/// Increment the persistent request counter before handling the request
pub async fn count_requests(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() != FAVICON_PATH {
        if let Some(counter) = &state.counter {
            if let Err(err) = counter.increment().await {
                tracing::error!(error = %err, "Failed to increment request counter");
                return ServerError::from(err).negotiate(request_format(&request));
            }
        }
    }
    next.run(request).await
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    // Generate or extract request ID
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Add to request extensions for handlers to access
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Request id carried in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
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
