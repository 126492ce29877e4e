//! Test infrastructure for pubsync.
//!
//! [`TestEnv`] starts two wiremock servers standing in for the content graph
//! and the index API, and builds an [`AppState`] pointed at them with a
//! fixed clock and known secrets. Tests drive the router with
//! `tower::ServiceExt::oneshot` and assert upstream traffic with
//! `Mock::expect`.

#![warn(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pubsync_api::{create_router, AppState, Config};
use pubsync_core::TestClock;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

pub mod fixtures;
pub mod http;

pub use fixtures::{ContentItemBuilder, WebhookBuilder};

/// Publish webhook secret configured in every test environment.
pub const WEBHOOK_KEY: &str = "webhook-test-key";
/// Crawl proxy secret configured in every test environment.
pub const CRAWL_KEY: &str = "crawl-test-key";
/// Content graph API key sent upstream.
pub const GRAPH_KEY: &str = "graph-test-key";
/// Index ingest API key sent upstream.
pub const INGEST_KEY: &str = "ingest-test-key";
/// Index search API key sent upstream.
pub const SEARCH_KEY: &str = "search-test-key";
/// Site root items must live under to be indexed.
pub const SITE_ROOT: &str = "/sitecore/content/site";
/// Default crawl root item.
pub const CRAWL_ROOT: &str = "/sitecore/content/site/home";
/// Fixed test time: 2024-03-05T12:00:00Z.
pub const FIXED_TIME_SECS: u64 = 1_709_640_000;
/// `v` parameter expected at [`FIXED_TIME_SECS`].
pub const DATE_STAMP: &str = "20240305";

/// Isolated environment with fake upstreams.
pub struct TestEnv {
    /// Fake content graph; GraphQL is served at [`http::GRAPHQL_PATH`]
    pub content_graph: MockServer,
    /// Fake index API; ingest at [`http::INGEST_PATH`], search at
    /// [`http::SEARCH_PATH`]
    pub index_api: MockServer,
    /// Clock shared with the application state
    pub clock: TestClock,
    config: Config,
}

impl TestEnv {
    /// Starts an environment with the default test configuration.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Starts an environment, letting the caller adjust the configuration.
    pub async fn with_config(configure: impl FnOnce(&mut Config)) -> Self {
        let content_graph = MockServer::start().await;
        let index_api = MockServer::start().await;
        let clock = TestClock::with_start_time(UNIX_EPOCH + Duration::from_secs(FIXED_TIME_SECS));

        let mut config = Config {
            webhook_api_key: WEBHOOK_KEY.to_string(),
            crawl_api_key: CRAWL_KEY.to_string(),
            content_graph_endpoint: format!("{}{}", content_graph.uri(), http::GRAPHQL_PATH),
            content_graph_api_key: GRAPH_KEY.to_string(),
            crawl_root_item: CRAWL_ROOT.to_string(),
            site_root_path: SITE_ROOT.to_string(),
            index_ingest_endpoint: format!("{}{}", index_api.uri(), http::INGEST_PATH),
            index_ingest_api_key: INGEST_KEY.to_string(),
            index_search_endpoint: format!("{}{}", index_api.uri(), http::SEARCH_PATH),
            index_search_api_key: SEARCH_KEY.to_string(),
            ..Config::default()
        };
        configure(&mut config);

        Self { content_graph, index_api, clock, config }
    }

    /// Builds application state against the fake upstreams.
    pub fn state(&self) -> AppState {
        AppState::new(self.config.clone(), Arc::new(self.clock.clone()))
            .expect("test configuration should build clients")
    }

    /// Builds the full router, middleware included.
    pub fn router(&self) -> Router {
        create_router(self.state())
    }

    /// Sends one request through a fresh router and decodes the JSON body.
    ///
    /// An empty body decodes as `Value::Null`.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.expect("router is infallible");

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };

        TestResponse { status, request_id, body }
    }

    /// Sends a GET request to `uri`.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Sends a JSON POST request to `uri`.
    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

/// Decoded router response.
#[derive(Debug)]
pub struct TestResponse {
    /// Response status
    pub status: StatusCode,
    /// Value of the `X-Request-Id` header
    pub request_id: Option<String>,
    /// JSON body
    pub body: Value,
}

impl TestResponse {
    /// Returns the taxonomy code of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }
}

/// Publish webhook URI carrying `api_key`.
pub fn webhook_uri(api_key: &str) -> String {
    format!("/api/onPublishEnd?api_key={api_key}")
}
