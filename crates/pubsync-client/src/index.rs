//! Index API client: bulk ingest and entity search.
//!
//! Every call carries the `v=YYYYMMDD` version parameter from the injected
//! clock. The ingest push never fails its caller; its result is reported as
//! a `PushOutcome` for logging only.

use std::sync::Arc;

use pubsync_core::{
    date_stamp, Clock, ContentItem, PushOutcome, SearchParams, TaxonomyFilterBuilder, Upstream,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    error::{ClientError, Result},
    USER_AGENT,
};

/// Maximum number of response body characters kept on a rejected push.
const MAX_REJECTION_BODY: usize = 1024;

/// Configuration for the index API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Bulk ingest endpoint URL. Empty disables pushing.
    pub ingest_endpoint: String,
    /// API key for the ingest endpoint.
    pub ingest_api_key: String,
    /// Entity search endpoint URL.
    pub search_endpoint: String,
    /// API key for the search endpoint.
    pub search_api_key: String,
    /// Entity type searched by the query proxy.
    pub entity_types: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            ingest_endpoint: String::new(),
            ingest_api_key: String::new(),
            search_endpoint: "https://api.yextapis.com/v2/accounts/me/entities".to_string(),
            search_api_key: String::new(),
            entity_types: "ce_blogPost".to_string(),
        }
    }
}

/// Client for the search/listings index API.
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: reqwest::Client,
    config: IndexConfig,
    filters: TaxonomyFilterBuilder,
    clock: Arc<dyn Clock>,
}

impl IndexClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: IndexConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build().map_err(|e| {
            ClientError::configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self { client, config, filters: TaxonomyFilterBuilder::default(), clock })
    }

    /// Pushes content items to the bulk ingest endpoint.
    ///
    /// The body is the JSON array of items. Failures are folded into the
    /// returned outcome rather than raised.
    #[instrument(name = "index_push", skip(self, items), fields(items = items.len()))]
    pub async fn push(&self, items: &[ContentItem]) -> PushOutcome {
        if self.config.ingest_endpoint.is_empty() {
            return PushOutcome::Failed { message: "ingest endpoint not configured".to_string() };
        }

        let version = date_stamp(self.clock.as_ref());
        let result = self
            .client
            .post(&self.config.ingest_endpoint)
            .query(&[("v", version.as_str()), ("api_key", self.config.ingest_api_key.as_str())])
            .json(items)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return PushOutcome::Failed { message: e.to_string() },
        };

        let status = response.status();
        if status.is_success() {
            return PushOutcome::Delivered { status: status.as_u16(), items: items.len() };
        }

        let body = match response.text().await {
            Ok(text) => text.chars().take(MAX_REJECTION_BODY).collect(),
            Err(e) => format!("[Failed to read response body: {e}]"),
        };

        PushOutcome::Rejected { status: status.as_u16(), body }
    }

    /// Query parameters for an entity search, in wire order.
    pub fn search_query(&self, params: &SearchParams) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("filter", self.filters.effective(params)),
            ("entityTypes", self.config.entity_types.clone()),
            ("api_key", self.config.search_api_key.clone()),
            ("limit", params.limit().to_string()),
            ("offset", params.offset().to_string()),
        ];

        if let Some(sort) = &params.sort {
            query.push(("sortBy", sort.to_json().to_string()));
        }

        query.push(("v", date_stamp(self.clock.as_ref())));
        query
    }

    /// Searches entities and returns the inner `response` member.
    ///
    /// # Errors
    ///
    /// - `Network` when the endpoint cannot be reached
    /// - `Transport` for non-2xx responses
    /// - `Decode` when the body is not JSON
    #[instrument(
        name = "index_search",
        skip(self, params),
        fields(limit = params.limit(), offset = params.offset())
    )]
    pub async fn search(&self, params: &SearchParams) -> Result<Value> {
        let query = self.search_query(params);

        let response = self
            .client
            .get(&self.config.search_endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                warn!("Request failed: {}", e);
                ClientError::network(Upstream::IndexApi, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Index search returned error status");
            return Err(ClientError::transport(Upstream::IndexApi, status));
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::decode(Upstream::IndexApi, e.to_string()))?;

        debug!("Index search succeeded");
        Ok(body.get_mut("response").map(Value::take).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use pubsync_core::{ItemUrl, SearchQuery, TestClock};
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    // 2024-03-05T12:00:00Z
    const MARCH_FIFTH_NOON: u64 = 1_709_640_000;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(TestClock::with_start_time(UNIX_EPOCH + Duration::from_secs(MARCH_FIFTH_NOON)))
    }

    fn client_for(server: &MockServer) -> IndexClient {
        IndexClient::new(
            IndexConfig {
                ingest_endpoint: format!("{}/push", server.uri()),
                ingest_api_key: "ingest-key".to_string(),
                search_endpoint: format!("{}/entities", server.uri()),
                search_api_key: "search-key".to_string(),
                ..IndexConfig::default()
            },
            clock(),
        )
        .unwrap()
    }

    fn item(id: &str) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            name: "page".to_string(),
            path: "/sitecore/content/site/page".to_string(),
            url: ItemUrl::default(),
            fields: Vec::new(),
        }
    }

    #[tokio::test]
    async fn push_posts_items_with_version_and_key() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/push"))
            .and(matchers::query_param("v", "20240305"))
            .and(matchers::query_param("api_key", "ingest-key"))
            .and(matchers::body_json(json!([item("a"), item("b")])))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).push(&[item("a"), item("b")]).await;

        assert_eq!(outcome, PushOutcome::Delivered { status: 202, items: 2 });
    }

    #[tokio::test]
    async fn rejected_push_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad entity"))
            .mount(&server)
            .await;

        let outcome = client_for(&server).push(&[item("a")]).await;

        assert_eq!(outcome, PushOutcome::Rejected { status: 400, body: "bad entity".to_string() });
    }

    #[tokio::test]
    async fn unconfigured_ingest_endpoint_fails_without_request() {
        let client = IndexClient::new(IndexConfig::default(), clock()).unwrap();

        let outcome = client.push(&[item("a")]).await;

        assert!(matches!(outcome, PushOutcome::Failed { .. }));
    }

    #[test]
    fn search_query_orders_parameters() {
        let client = IndexClient::new(IndexConfig::default(), clock()).unwrap();
        let params = SearchParams::from(SearchQuery {
            content_types: Some("Blog".to_string()),
            page: Some("3".to_string()),
            num_results: Some("5".to_string()),
            sort: Some("c_date:desc".to_string()),
            ..SearchQuery::default()
        });

        let query = client.search_query(&params);
        let names: Vec<&str> = query.iter().map(|(name, _)| *name).collect();

        assert_eq!(names, vec![
            "filter",
            "entityTypes",
            "api_key",
            "limit",
            "offset",
            "sortBy",
            "v"
        ]);
        assert_eq!(query[0].1, r#"{"$and":[{"c_contentType":{"$in":["Blog"]}}]}"#);
        assert_eq!(query[1].1, "ce_blogPost");
        assert_eq!(query[3].1, "5");
        assert_eq!(query[4].1, "10");
        assert_eq!(query[5].1, r#"[{"c_date":"DESCENDING"}]"#);
        assert_eq!(query[6].1, "20240305");
    }

    #[test]
    fn search_query_without_sort_omits_sort_by() {
        let client = IndexClient::new(IndexConfig::default(), clock()).unwrap();

        let query = client.search_query(&SearchParams::from(SearchQuery::default()));

        assert!(query.iter().all(|(name, _)| *name != "sortBy"));
        assert_eq!(query[0], ("filter", "{}".to_string()));
        assert_eq!(query[3], ("limit", "9".to_string()));
        assert_eq!(query[4], ("offset", "0".to_string()));
    }

    #[tokio::test]
    async fn search_returns_inner_response() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/entities"))
            .and(matchers::query_param("api_key", "search-key"))
            .and(matchers::query_param("entityTypes", "ce_blogPost"))
            .and(matchers::query_param("filter", "{}"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": { "uuid": "x" },
                "response": { "count": 1, "entities": [{ "name": "Post" }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response =
            client_for(&server).search(&SearchParams::from(SearchQuery::default())).await.unwrap();

        assert_eq!(response, json!({ "count": 1, "entities": [{ "name": "Post" }] }));
    }

    #[tokio::test]
    async fn search_error_status_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .search(&SearchParams::from(SearchQuery::default()))
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::Transport { status: 401, .. }));
    }
}
