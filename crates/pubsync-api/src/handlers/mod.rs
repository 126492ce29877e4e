//! HTTP request handlers.
//!
//! Handlers are grouped by route:
//! - `publish` - publish-completed webhook
//! - `crawl` - content graph crawl proxy
//! - `query` - index API query proxy
//! - `health` - health and liveness probes
//!
//! # Error Handling
//!
//! Failures are reported as `{"error": {"code": "...", "message": "..."}}`
//! with the status from [`PubsyncError::status`]. The proxies consult the
//! configured [`ProxyFailurePolicy`] first and may answer `200 null` instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pubsync_core::{ProxyFailurePolicy, PubsyncError};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

pub mod crawl;
pub mod health;
pub mod publish;
pub mod query;

pub use crawl::crawl_proxy;
pub use health::{health_check, liveness_check};
pub use publish::publish_end;
pub use query::query_proxy;

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the taxonomy (E1001-E9999)
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

/// Handler error rendered as a structured error response.
#[derive(Debug)]
pub struct ApiError(pub PubsyncError);

impl From<PubsyncError> for ApiError {
    fn from(error: PubsyncError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        create_error_response(&self.0)
    }
}

/// Renders `error` with its taxonomy code and HTTP status.
pub fn create_error_response(error: &PubsyncError) -> Response {
    let status =
        StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let error_response = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };

    (status, Json(error_response)).into_response()
}

/// Answers a failed proxy call according to `policy`.
pub fn proxy_failure(policy: ProxyFailurePolicy, error: &PubsyncError) -> Response {
    match policy {
        ProxyFailurePolicy::BestEffort => {
            warn!(code = error.code(), error = %error, "Upstream call failed, answering null");
            (StatusCode::OK, Json(Value::Null)).into_response()
        },
        ProxyFailurePolicy::Surface => {
            error!(code = error.code(), error = %error, "Upstream call failed");
            create_error_response(error)
        },
    }
}
