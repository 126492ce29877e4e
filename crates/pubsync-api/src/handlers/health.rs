//! Health check handlers for service monitoring.
//!
//! Neither endpoint probes the content graph or the index API; health only
//! reflects whether the service is configured to do its job.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use pubsync_core::Clock;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{AppState, Config};

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some secrets are missing, affected routes reject or fail
    Degraded,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Whether all secrets are configured
    pub configuration: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Optional detail when the component is not up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Component-level health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy
    Up,
    /// Component is not usable
    Down,
}

/// Health service that encapsulates the clock for testable health checks.
pub struct HealthService {
    clock: Arc<dyn Clock>,
}

impl HealthService {
    /// Creates a new health service with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Reports health from the loaded configuration.
    pub fn health_check(&self, config: &Config) -> HealthResponse {
        let missing = config.missing_secrets();

        let (status, configuration) = if missing.is_empty() {
            (HealthStatus::Healthy, ComponentHealth { status: ComponentStatus::Up, message: None })
        } else {
            (HealthStatus::Degraded, ComponentHealth {
                status: ComponentStatus::Down,
                message: Some(format!("missing secrets: {}", missing.join(", "))),
            })
        };

        HealthResponse {
            status,
            timestamp: DateTime::<Utc>::from(self.clock.now_system()),
            checks: HealthChecks { configuration },
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check endpoint handler.
///
/// Always answers 200; a degraded service still serves the routes whose
/// secrets are present.
#[instrument(name = "health_check", skip(app_state))]
pub async fn health_check(State(app_state): State<AppState>) -> Response {
    let health_service = HealthService::new(app_state.clock.clone());
    let response = health_service.health_check(&app_state.config);

    debug!(status = ?response.status, "Health check completed");

    (StatusCode::OK, Json(response)).into_response()
}

/// Liveness check endpoint for orchestration probes.
#[instrument(name = "liveness_check", skip(app_state))]
pub async fn liveness_check(State(app_state): State<AppState>) -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": DateTime::<Utc>::from(app_state.clock.now_system()),
        "service": "pubsync"
    });

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use pubsync_core::TestClock;

    use super::*;

    fn service() -> HealthService {
        let clock = TestClock::with_start_time(UNIX_EPOCH + Duration::from_secs(1_709_640_000));
        HealthService::new(Arc::new(clock))
    }

    #[test]
    fn configured_service_is_healthy() {
        let config = Config {
            webhook_api_key: "a".to_string(),
            crawl_api_key: "b".to_string(),
            content_graph_api_key: "c".to_string(),
            index_ingest_api_key: "d".to_string(),
            index_search_api_key: "e".to_string(),
            ..Config::default()
        };

        let response = service().health_check(&config);

        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.checks.configuration.status, ComponentStatus::Up);
        assert_eq!(response.timestamp.to_rfc3339(), "2024-03-05T12:00:00+00:00");
    }

    #[test]
    fn missing_secrets_degrade() {
        let response = service().health_check(&Config::default());

        assert_eq!(response.status, HealthStatus::Degraded);
        let message = response.checks.configuration.message.unwrap();
        assert!(message.contains("WEBHOOK_API_KEY"));
    }
}
