//! Content graph GraphQL client.
//!
//! Posts `{query, variables}` with the provider's API-key header and unwraps
//! the `data` member. Non-2xx statuses and non-empty `errors` arrays are
//! failures; a `null` `data` is not.

use pubsync_core::{ContentItem, CrawlRequest, GraphQLRequest, ItemGuid, Upstream};
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};

use crate::{
    error::{ClientError, Result},
    USER_AGENT,
};

/// Looks up a single content item by id.
pub const ITEM_QUERY: &str = r"
query ($id: String!, $language: String!) {
  item(path: $id, language: $language) {
    id
    name
    path
    url {
      path
      url
    }
    fields {
      name
      jsonValue
    }
  }
}
";

/// Pages through items under a root that have a layout and are indexable.
pub const CRAWL_QUERY: &str = r#"
query SiteCrawl(
  $numResults: Int
  $after: String
  $rootItem: String!
  $hasLayout: String!
  $noIndex: Int
) {
  search(
    where: {
      AND: [
        { name: "_path", value: $rootItem, operator: EQ }
        { name: "_hasLayout", value: $hasLayout }
        { name: "noIndex", value: $noIndex, operator: NEQ }
      ]
    }
    first: $numResults
    after: $after
  ) {
    total
    pageInfo {
      endCursor
      hasNext
    }
    results {
      id
      name
      path
      url {
        path
        url
      }
      fields {
        name
        jsonValue
      }
    }
  }
}
"#;

/// Configuration for the content graph client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// API key sent in `api_key_header`.
    pub api_key: String,
    /// Name of the API-key header.
    pub api_key_header: String,
    /// Language items are resolved in.
    pub language: String,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://edge.sitecorecloud.io/api/graphql/v1".to_string(),
            api_key: String::new(),
            api_key_header: "sc_apikey".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLErrorMessage>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorMessage {
    #[serde(default)]
    message: String,
}

/// Client for the CMS content graph.
#[derive(Debug, Clone)]
pub struct GraphQLClient {
    client: reqwest::Client,
    config: GraphQLConfig,
    api_key_header: HeaderName,
}

impl GraphQLClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the API-key header name is not
    /// a valid header or the HTTP client cannot be built.
    pub fn new(config: GraphQLConfig) -> Result<Self> {
        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|e| {
                ClientError::configuration(format!(
                    "invalid API key header '{}': {e}",
                    config.api_key_header
                ))
            })?;

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build().map_err(|e| {
            ClientError::configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self { client, config, api_key_header })
    }

    /// Executes a GraphQL request and returns its `data` member.
    ///
    /// # Errors
    ///
    /// - `Network` when the endpoint cannot be reached
    /// - `Transport` for non-2xx responses
    /// - `Decode` when the body is not JSON
    /// - `GraphQl` when the body carries a non-empty `errors` array
    pub async fn execute(&self, request: &GraphQLRequest) -> Result<Value> {
        let span = info_span!(
            "graphql_request",
            endpoint = %self.config.endpoint,
            variables = request.variables().len()
        );

        async move {
            let response = self
                .client
                .post(&self.config.endpoint)
                .header(self.api_key_header.clone(), &self.config.api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    warn!("Request failed: {}", e);
                    ClientError::network(Upstream::ContentGraph, e.to_string())
                })?;

            let status = response.status();
            if !status.is_success() {
                warn!(status = status.as_u16(), "GraphQL endpoint returned error status");
                return Err(ClientError::transport(Upstream::ContentGraph, status));
            }

            let body: GraphQLResponse = response
                .json()
                .await
                .map_err(|e| ClientError::decode(Upstream::ContentGraph, e.to_string()))?;

            if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
                let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                warn!(errors = messages.len(), "GraphQL response carried errors");
                return Err(ClientError::GraphQl { messages });
            }

            debug!("GraphQL request succeeded");
            Ok(body.data.unwrap_or(Value::Null))
        }
        .instrument(span)
        .await
    }

    /// Fetches the content item with the given GUID.
    ///
    /// Returns `Ok(None)` when the content graph has no such item.
    ///
    /// # Errors
    ///
    /// Propagates `execute` errors, and `Decode` when the item does not have
    /// the content item shape.
    pub async fn fetch_item(&self, guid: &ItemGuid) -> Result<Option<ContentItem>> {
        let request = GraphQLRequest::new(ITEM_QUERY)
            .variable("id", guid.as_str())
            .variable("language", self.config.language.as_str());

        debug!(guid = %guid, "Fetching content item");
        let mut data = self.execute(&request).await?;

        match data.get_mut("item").map(Value::take) {
            None | Some(Value::Null) => Ok(None),
            Some(item) => serde_json::from_value(item)
                .map(Some)
                .map_err(|e| ClientError::decode(Upstream::ContentGraph, e.to_string())),
        }
    }

    /// Runs one page of the crawl search and returns the raw `data` payload.
    ///
    /// # Errors
    ///
    /// Propagates `execute` errors.
    pub async fn crawl(&self, crawl: &CrawlRequest) -> Result<Value> {
        let request = GraphQLRequest::new(CRAWL_QUERY)
            .variable("numResults", CrawlRequest::PAGE_SIZE)
            .variable("after", crawl.cursor.as_str())
            .variable("rootItem", crawl.root_item.as_str())
            .variable("hasLayout", "true")
            .variable("noIndex", 1);

        debug!(cursor = %crawl.cursor, root = %crawl.root_item, "Running crawl query");
        self.execute(&request).await
    }
}
