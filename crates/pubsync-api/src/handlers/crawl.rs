//! Crawl proxy over the content graph.
//!
//! Lets the index crawler page through every routable item under a root
//! path without holding the content graph API key itself.

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pubsync_core::{CrawlRequest, PubsyncError};
use tracing::{info, instrument, warn};

use super::{create_error_response, proxy_failure};
use crate::AppState;

/// Crawl proxy query parameters.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CrawlQuery {
    /// Opaque cursor from the previous page's `pageInfo.endCursor`
    pub cursor: Option<String>,
    /// Root item path, falls back to the configured crawl root
    pub root: Option<String>,
}

impl CrawlQuery {
    /// Collects decoded URL pairs. A repeated parameter keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key.as_ref() {
                "cursor" => query.cursor = Some(value.into()),
                "root" => query.root = Some(value.into()),
                _ => {},
            }
        }

        query
    }

    /// Builds the crawl request, filling in the default root.
    pub fn into_request(self, default_root: &str) -> CrawlRequest {
        let root = self.root.filter(|root| !root.is_empty());

        CrawlRequest::new(
            self.cursor.unwrap_or_default(),
            root.unwrap_or_else(|| default_root.to_string()),
        )
    }
}

/// Runs one page of the crawl search and returns the raw GraphQL `data`.
///
/// Authentication runs in middleware before this handler, so a wrong method
/// without a valid key is still answered with 403. Upstream failures are
/// answered according to the proxy failure policy.
#[instrument(name = "crawl_proxy", skip(method, state, pairs), fields(method = %method))]
pub async fn crawl_proxy(
    State(state): State<AppState>,
    method: Method,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    if method != Method::GET {
        warn!("Rejecting crawl request with unsupported method");
        return create_error_response(&PubsyncError::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let request = CrawlQuery::from_pairs(pairs).into_request(&state.config.crawl_root_item);

    info!(root = %request.root_item, cursor = %request.cursor, "Proxying crawl page");

    match state.graphql.crawl(&request).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => proxy_failure(state.config.proxy_failure_policy, &PubsyncError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_use_defaults() {
        let request = CrawlQuery::default().into_request("/sitecore/content/site");

        assert_eq!(request.cursor, "");
        assert_eq!(request.root_item, "/sitecore/content/site");
    }

    #[test]
    fn empty_root_uses_default() {
        let query = CrawlQuery { cursor: Some("abc".to_string()), root: Some(String::new()) };
        let request = query.into_request("/sitecore/content/site");

        assert_eq!(request.cursor, "abc");
        assert_eq!(request.root_item, "/sitecore/content/site");
    }

    #[test]
    fn repeated_parameters_keep_last_value() {
        let query = CrawlQuery::from_pairs([
            ("cursor", "first"),
            ("api_key", "secret"),
            ("cursor", "second"),
            ("root", "/sitecore/content/other"),
        ]);

        assert_eq!(query.cursor.as_deref(), Some("second"));
        assert_eq!(query.root.as_deref(), Some("/sitecore/content/other"));
    }

    #[test]
    fn explicit_root_wins() {
        let query = CrawlQuery { cursor: None, root: Some("/sitecore/content/other".to_string()) };

        assert_eq!(query.into_request("/default").root_item, "/sitecore/content/other");
    }
}
