//! Shared-secret authentication for the webhook and crawl routes.
//!
//! Both routes carry their secret in the `api_key` query parameter. The
//! webhook rejects with 401, the crawl proxy with 403, in both cases before
//! the handler runs and before any outbound call is made.

use axum::{
    extract::{Query, Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use pubsync_core::PubsyncError;
use serde::Deserialize;
use tracing::warn;

use crate::{handlers::ApiError, AppState};

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Extracts the `api_key` query parameter.
fn extract_api_key(uri: &Uri) -> Option<String> {
    Query::<ApiKeyQuery>::try_from_uri(uri).ok().and_then(|Query(query)| query.api_key)
}

/// Checks a presented key against the configured secret.
///
/// An empty secret matches nothing.
fn key_matches(presented: Option<&str>, expected: &str) -> bool {
    !expected.is_empty() && presented == Some(expected)
}

/// Rejects publish webhook requests without the webhook secret (401).
pub async fn require_webhook_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = extract_api_key(req.uri());

    if !key_matches(api_key.as_deref(), &state.config.webhook_api_key) {
        warn!(path = req.uri().path(), "Webhook request with invalid API key");
        return Err(PubsyncError::Unauthorized.into());
    }

    Ok(next.run(req).await)
}

/// Rejects crawl requests without the crawl secret (403).
pub async fn require_crawl_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = extract_api_key(req.uri());

    if !key_matches(api_key.as_deref(), &state.config.crawl_api_key) {
        warn!(path = req.uri().path(), "Crawl request with invalid API key");
        return Err(PubsyncError::Forbidden.into());
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_api_key_from_query() {
        let uri: Uri = "/api/crawl?cursor=abc&api_key=crawl-secret".parse().unwrap();
        assert_eq!(extract_api_key(&uri), Some("crawl-secret".to_string()));
    }

    #[test]
    fn extract_api_key_decodes_percent_encoding() {
        let uri: Uri = "/api/onPublishEnd?api_key=a%2Bb".parse().unwrap();
        assert_eq!(extract_api_key(&uri), Some("a+b".to_string()));
    }

    #[test]
    fn extract_api_key_returns_none_without_parameter() {
        let uri: Uri = "/api/crawl?cursor=abc".parse().unwrap();
        assert_eq!(extract_api_key(&uri), None);

        let uri: Uri = "/api/crawl".parse().unwrap();
        assert_eq!(extract_api_key(&uri), None);
    }

    #[test]
    fn empty_secret_matches_nothing() {
        assert!(!key_matches(Some(""), ""));
        assert!(!key_matches(None, ""));
    }

    #[test]
    fn key_must_match_exactly() {
        assert!(key_matches(Some("secret"), "secret"));
        assert!(!key_matches(Some("Secret"), "secret"));
        assert!(!key_matches(None, "secret"));
    }
}
