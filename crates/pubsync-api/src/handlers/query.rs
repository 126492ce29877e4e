//! Query proxy over the index API's entity search.

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pubsync_core::{PubsyncError, SearchParams, SearchQuery};
use tracing::{info, instrument, warn};

use super::{create_error_response, proxy_failure};
use crate::AppState;

/// Translates taxonomy URL parameters into an index search and returns the
/// index's `response` member.
///
/// Repeated parameters never fail the request: taxonomy values are merged
/// and anything else keeps its last value.
#[instrument(name = "query_proxy", skip(method, state, pairs), fields(method = %method))]
pub async fn query_proxy(
    State(state): State<AppState>,
    method: Method,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    if method != Method::GET {
        warn!("Rejecting query request with unsupported method");
        return create_error_response(&PubsyncError::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let params = SearchParams::from(SearchQuery::from_pairs(pairs));

    info!(
        page = params.page,
        num_results = params.num_results,
        sorted = params.sort.is_some(),
        "Proxying index search"
    );

    match state.index.search(&params).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => proxy_failure(state.config.proxy_failure_policy, &PubsyncError::from(e)),
    }
}
