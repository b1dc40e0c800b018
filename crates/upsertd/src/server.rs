//! HTTP front end
//!
//! Routes:
//! - `GET  /`        - Upsert the caller's address, plain HTTP request
//! - `POST /`        - Same, request body is logged (lossily decoded, never rejected)
//! - `POST /invoke`  - Gateway proxy shape: JSON `Trigger` in, JSON `Response` out
//! - `GET  /health`  - Liveness check

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;
use upsert_core::{Response, Trigger, UpdateWorkflow};

/// Application state shared between handlers
pub struct AppState {
    /// The update workflow
    pub workflow: UpdateWorkflow,
    /// Take the caller address from forwarding headers when present
    pub trust_forwarded: bool,
}

/// Build the router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(invoke_http).post(invoke_http))
        .route("/invoke", post(invoke_gateway))
        .route("/health", get(health))
        .with_state(state)
}

/// Handler for plain HTTP invocations
async fn invoke_http(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let source_address = caller_address(&headers, peer, state.trust_forwarded);
    debug!("Invocation from {} (peer {})", source_address, peer);

    let body = String::from_utf8_lossy(&body).into_owned();
    let response = state.workflow.handle(&Trigger::new(body, source_address)).await;
    into_http(response)
}

/// Handler for gateway-proxy invocations
async fn invoke_gateway(
    State(state): State<Arc<AppState>>,
    Json(trigger): Json<Trigger>,
) -> Json<Response> {
    Json(state.workflow.handle(&trigger).await)
}

/// Handler for `/health`
async fn health() -> &'static str {
    "ok"
}

/// Resolve the caller's apparent address
///
/// With `trust_forwarded`, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`; otherwise (or when neither is present) the TCP peer.
pub fn caller_address(headers: &HeaderMap, peer: SocketAddr, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(address) = forwarded.or_else(real_ip) {
            return address.to_string();
        }
    }

    peer.ip().to_string()
}

/// Convert a workflow response into an HTTP response
pub fn into_http(response: Response) -> axum::response::Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    (status, headers, response.body).into_response()
}
