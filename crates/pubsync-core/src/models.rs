//! Request-scoped domain models.
//!
//! Defines the publish webhook payload, the content items resolved from the
//! content graph, and the immutable GraphQL request envelope. Nothing here
//! outlives a single handler invocation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PubsyncError, Result};

/// Entity definition of update notifications that trigger re-indexing.
pub const LAYOUT_DATA: &str = "LayoutData";

/// Publish-completed webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Update notifications in delivery order
    pub updates: Vec<UpdateNotification>,
}

impl WebhookPayload {
    /// Parses a raw webhook body.
    ///
    /// # Errors
    ///
    /// Returns `PubsyncError::MalformedRequest` when the body is not JSON or
    /// lacks the `updates` array.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| PubsyncError::malformed(e.to_string()))
    }

    /// Iterates the notifications that should be re-indexed.
    pub fn layout_updates(&self) -> impl Iterator<Item = &UpdateNotification> {
        self.updates.iter().filter(|update| update.is_layout_data())
    }
}

/// A single entry in the webhook `updates` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNotification {
    /// Composite identifier, GUID first
    pub identifier: String,
    /// Kind of entity that changed
    pub entity_definition: String,
}

impl UpdateNotification {
    /// Returns whether this notification is a `LayoutData` update.
    pub fn is_layout_data(&self) -> bool {
        self.entity_definition == LAYOUT_DATA
    }

    /// Extracts the content item GUID: the first hyphen-delimited segment.
    pub fn guid(&self) -> ItemGuid {
        let guid = self.identifier.split('-').next().unwrap_or_default();
        ItemGuid(guid.to_string())
    }
}

/// Canonical content item GUID extracted from an update identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemGuid(pub String);

impl ItemGuid {
    /// Returns the GUID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// GraphQL request envelope sent to the content graph.
///
/// Built once per outbound call and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    query: String,
    variables: Map<String, Value>,
}

impl GraphQLRequest {
    /// Creates a request with no variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), variables: Map::new() }
    }

    /// Adds a variable, consuming and returning the request.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Returns the query document.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the variables map.
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }
}

/// Content item as returned by the content graph and pushed to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Item identifier
    pub id: String,
    /// Item name
    pub name: String,
    /// Content tree path
    pub path: String,
    /// Public route of the item
    #[serde(default)]
    pub url: ItemUrl,
    /// Item fields in content graph order
    #[serde(default)]
    pub fields: Vec<ItemField>,
}

impl ContentItem {
    /// Returns whether the item lives under the given site root.
    ///
    /// Publish webhooks fire for every site on the instance, so items from
    /// other sites must be dropped here.
    pub fn is_under(&self, site_root: &str) -> bool {
        self.path.starts_with(site_root)
    }
}

/// Route information of a content item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUrl {
    /// Site-relative path
    #[serde(default)]
    pub path: String,
    /// Absolute URL
    #[serde(default)]
    pub url: String,
}

/// Named field value of a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemField {
    /// Field name
    pub name: String,
    /// Field value as structured JSON
    #[serde(rename = "jsonValue", default)]
    pub json_value: Value,
}

/// One page of the crawl proxy's "search under root path" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Opaque pagination cursor, empty for the first page
    pub cursor: String,
    /// Root item the search is restricted to
    pub root_item: String,
}

impl CrawlRequest {
    /// Fixed number of results per crawl page.
    pub const PAGE_SIZE: u32 = 10;

    /// Creates a crawl request for the page after `cursor`.
    pub fn new(cursor: impl Into<String>, root_item: impl Into<String>) -> Self {
        Self { cursor: cursor.into(), root_item: root_item.into() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn guid_is_first_identifier_segment() {
        let update = UpdateNotification {
            identifier: "11112222-3333-4444".to_string(),
            entity_definition: LAYOUT_DATA.to_string(),
        };

        assert_eq!(update.guid().as_str(), "11112222");
    }

    #[test]
    fn guid_without_hyphen_is_whole_identifier() {
        let update = UpdateNotification {
            identifier: "ABCDEF".to_string(),
            entity_definition: LAYOUT_DATA.to_string(),
        };

        assert_eq!(update.guid().as_str(), "ABCDEF");
    }

    #[test]
    fn only_layout_data_updates_are_actionable() {
        let payload = WebhookPayload::from_slice(
            json!({
                "updates": [
                    { "identifier": "AAA-1", "entity_definition": "LayoutData" },
                    { "identifier": "BBB-2", "entity_definition": "Item" },
                    { "identifier": "CCC-3", "entity_definition": "LayoutData" }
                ]
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        let guids: Vec<_> = payload.layout_updates().map(UpdateNotification::guid).collect();
        assert_eq!(guids, vec![ItemGuid("AAA".to_string()), ItemGuid("CCC".to_string())]);
    }

    #[test]
    fn payload_without_updates_is_malformed() {
        let error = WebhookPayload::from_slice(br#"{"events": []}"#).unwrap_err();
        assert_eq!(error.code(), "E1004");

        let error = WebhookPayload::from_slice(b"not json").unwrap_err();
        assert_eq!(error.status(), 400);
    }

    #[test]
    fn graphql_request_serializes_query_and_variables() {
        let request = GraphQLRequest::new("query ($id: String!) { item(path: $id) { id } }")
            .variable("id", "11112222");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "query ($id: String!) { item(path: $id) { id } }",
                "variables": { "id": "11112222" }
            })
        );
    }

    #[test]
    fn content_item_roundtrips_json_value_field_name() {
        let raw = json!({
            "id": "11112222",
            "name": "home",
            "path": "/sitecore/content/site/home",
            "url": { "path": "/", "url": "https://example.com/" },
            "fields": [{ "name": "title", "jsonValue": { "value": "Home" } }]
        });

        let item: ContentItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.fields[0].json_value, json!({ "value": "Home" }));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn site_root_is_a_path_prefix() {
        let item = ContentItem {
            id: "1".to_string(),
            name: "page".to_string(),
            path: "/sitecore/content/site-a/page".to_string(),
            url: ItemUrl::default(),
            fields: Vec::new(),
        };

        assert!(item.is_under("/sitecore/content/site-a"));
        assert!(!item.is_under("/sitecore/content/site-b"));
    }
}
