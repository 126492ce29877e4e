//! Test data builders for webhook payloads and content items.

use serde_json::{json, Value};

use crate::SITE_ROOT;

/// Builder for publish webhook payloads.
#[derive(Debug, Default)]
pub struct WebhookBuilder {
    updates: Vec<Value>,
}

impl WebhookBuilder {
    /// Creates an empty payload builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `LayoutData` update for the item with `guid`.
    ///
    /// The identifier carries a language and version suffix the way the CMS
    /// sends it.
    #[must_use]
    pub fn layout(self, guid: &str) -> Self {
        self.update(&format!("{guid}-en-1"), "LayoutData")
    }

    /// Adds an update with an arbitrary identifier and entity definition.
    #[must_use]
    pub fn update(mut self, identifier: &str, entity_definition: &str) -> Self {
        self.updates.push(json!({
            "identifier": identifier,
            "entity_definition": entity_definition
        }));
        self
    }

    /// Builds the JSON payload.
    pub fn build(self) -> Value {
        json!({ "updates": self.updates })
    }
}

/// Builder for content items in the content graph's response shape.
#[derive(Debug)]
pub struct ContentItemBuilder {
    id: String,
    name: String,
    path: String,
    url: Value,
    fields: Vec<Value>,
}

impl ContentItemBuilder {
    /// Creates an item under the test site root.
    pub fn new(id: &str) -> Self {
        let path = format!("{SITE_ROOT}/blog/{id}");
        Self {
            id: id.to_string(),
            name: id.to_string(),
            url: json!({
                "path": format!("/blog/{id}"),
                "url": format!("https://site.test/blog/{id}")
            }),
            path,
            fields: Vec::new(),
        }
    }

    /// Sets the item name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sets the content tree path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Adds a field with its JSON value.
    #[must_use]
    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.fields.push(json!({ "name": name, "jsonValue": value }));
        self
    }

    /// Builds the item JSON.
    pub fn build(self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "path": self.path,
            "url": self.url,
            "fields": self.fields
        })
    }
}
