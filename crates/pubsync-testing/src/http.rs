//! Mock builders for the fake content graph and index API.
//!
//! Builders return unmounted mocks so tests can attach `expect(n)` before
//! mounting them on the matching server.

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, body_partial_json, header, method, path, query_param},
    Mock, MockBuilder, ResponseTemplate,
};

use crate::{DATE_STAMP, GRAPH_KEY, INGEST_KEY, SEARCH_KEY};

/// GraphQL path on the content graph server.
pub const GRAPHQL_PATH: &str = "/graphql";
/// Bulk ingest path on the index API server.
pub const INGEST_PATH: &str = "/push";
/// Entity search path on the index API server.
pub const SEARCH_PATH: &str = "/entities";

fn graphql() -> MockBuilder {
    Mock::given(method("POST")).and(path(GRAPHQL_PATH)).and(header("sc_apikey", GRAPH_KEY))
}

/// Answers the item lookup for `guid` with `item`.
pub fn item(guid: &str, item: Value) -> Mock {
    graphql()
        .and(body_partial_json(json!({ "variables": { "id": guid } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "item": item } })))
}

/// Answers the item lookup for `guid` with a null item.
pub fn missing_item(guid: &str) -> Mock {
    item(guid, Value::Null)
}

/// Answers the item lookup for `guid` with GraphQL errors.
pub fn item_errors(guid: &str, messages: &[&str]) -> Mock {
    let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();

    graphql()
        .and(body_partial_json(json!({ "variables": { "id": guid } })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": null, "errors": errors })),
        )
}

/// Answers any GraphQL request with `status`.
pub fn graphql_status(status: u16) -> Mock {
    graphql().respond_with(ResponseTemplate::new(status))
}

/// Answers the crawl search for `root` and `cursor` with `data`.
pub fn crawl(root: &str, cursor: &str, data: Value) -> Mock {
    graphql()
        .and(body_partial_json(json!({
            "variables": {
                "numResults": 10,
                "after": cursor,
                "rootItem": root,
                "hasLayout": "true",
                "noIndex": 1
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
}

/// Accepts a bulk ingest push stamped with today's version.
pub fn ingest(status: u16) -> Mock {
    Mock::given(method("POST"))
        .and(path(INGEST_PATH))
        .and(query_param("v", DATE_STAMP))
        .and(query_param("api_key", INGEST_KEY))
        .respond_with(ResponseTemplate::new(status))
}

/// Accepts a bulk ingest push whose body equals `items`.
pub fn ingest_items(items: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path(INGEST_PATH))
        .and(query_param("v", DATE_STAMP))
        .and(body_json(items))
        .respond_with(ResponseTemplate::new(200))
}

/// Matches an entity search carrying the search key and today's version.
///
/// Tests add their own `query_param` matchers before responding with
/// [`search_response`].
pub fn search() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("api_key", SEARCH_KEY))
        .and(query_param("v", DATE_STAMP))
}

/// Index search body wrapping `response` in the API envelope.
pub fn search_response(response: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "meta": { "uuid": "test" }, "response": response }))
}

/// Answers any entity search with `status`.
pub fn search_status(status: u16) -> Mock {
    Mock::given(method("GET")).and(path(SEARCH_PATH)).respond_with(ResponseTemplate::new(status))
}
