//! Integration tests for the crawl proxy.

use axum::http::StatusCode;
use pubsync_core::ProxyFailurePolicy;
use pubsync_testing::{http, TestEnv, CRAWL_KEY, CRAWL_ROOT};
use serde_json::json;

fn crawl_page() -> serde_json::Value {
    json!({
        "search": {
            "total": 12,
            "pageInfo": { "endCursor": "MTA=", "hasNext": true },
            "results": [
                { "id": "aaaa", "name": "first", "path": "/sitecore/content/site/home/first" }
            ]
        }
    })
}

/// Without the crawl secret nothing reaches the content graph.
#[tokio::test]
async fn missing_key_is_forbidden_without_outbound_call() {
    let env = TestEnv::new().await;
    http::graphql_status(200).expect(0).mount(&env.content_graph).await;

    let response = env.get("/api/crawl").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("E1002"));

    let response = env.get("/api/crawl?api_key=wrong&cursor=abc").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn defaults_to_configured_root_and_empty_cursor() {
    let env = TestEnv::new().await;
    http::crawl(CRAWL_ROOT, "", crawl_page()).expect(1).mount(&env.content_graph).await;

    let response = env.get(&format!("/api/crawl?api_key={CRAWL_KEY}")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, crawl_page());
}

#[tokio::test]
async fn forwards_cursor_and_root() {
    let env = TestEnv::new().await;
    http::crawl("/sitecore/content/site/news", "MTA=", crawl_page())
        .expect(1)
        .mount(&env.content_graph)
        .await;

    let uri = format!(
        "/api/crawl?api_key={CRAWL_KEY}&cursor=MTA%3D&root=%2Fsitecore%2Fcontent%2Fsite%2Fnews"
    );
    let response = env.get(&uri).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["search"]["pageInfo"]["hasNext"], true);
}

/// A repeated cursor keeps its last value instead of failing decoding.
#[tokio::test]
async fn repeated_cursor_keeps_last_value() {
    let env = TestEnv::new().await;
    http::crawl(CRAWL_ROOT, "b", crawl_page()).expect(1).mount(&env.content_graph).await;

    let response = env.get(&format!("/api/crawl?api_key={CRAWL_KEY}&cursor=a&cursor=b")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, crawl_page());
}

/// Authentication still runs first for a wrong method.
#[tokio::test]
async fn non_get_is_method_not_allowed_after_auth() {
    let env = TestEnv::new().await;
    http::graphql_status(200).expect(0).mount(&env.content_graph).await;

    let response = env.post_json("/api/crawl", &json!({})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("E1002"));

    let response = env.post_json(&format!("/api/crawl?api_key={CRAWL_KEY}"), &json!({})).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.error_code(), Some("E1003"));
}

/// Upstream failures answer `200 null` under the default policy.
#[tokio::test]
async fn upstream_failure_is_swallowed_by_default() {
    let env = TestEnv::new().await;
    http::graphql_status(500).expect(1).mount(&env.content_graph).await;

    let response = env.get(&format!("/api/crawl?api_key={CRAWL_KEY}")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn upstream_failure_is_surfaced_when_configured() {
    let env = TestEnv::with_config(|config| {
        config.proxy_failure_policy = ProxyFailurePolicy::Surface;
    })
    .await;
    http::graphql_status(500).expect(1).mount(&env.content_graph).await;

    let response = env.get(&format!("/api/crawl?api_key={CRAWL_KEY}")).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.error_code(), Some("E2001"));
}
