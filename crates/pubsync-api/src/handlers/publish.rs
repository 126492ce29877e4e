//! Publish-completed webhook.
//!
//! The CMS calls this after a publish job with the list of entities it
//! touched. Every `LayoutData` update is resolved through the content graph,
//! items outside the site root are dropped, and the rest are pushed to the
//! index API's bulk ingest endpoint in one request.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use pubsync_core::{
    ContentItem, ItemFailureAction, ItemGuid, PubsyncError, PushOutcome, WebhookPayload,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::ApiError;
use crate::AppState;

/// Acknowledgement returned to the CMS.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// Always "Webhook event received"
    pub message: &'static str,
    /// Items resolved under the site root and sent to the index
    pub resolved: usize,
    /// Items that were missing or outside the site root
    pub skipped: usize,
    /// Whether the ingest push was accepted
    pub pushed: bool,
    /// GUIDs whose lookup failed and were skipped
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

/// Items collected from one webhook payload.
#[derive(Debug, Default)]
struct ResolvedBatch {
    items: Vec<ContentItem>,
    actionable: usize,
    skipped: usize,
    failed: Vec<ItemGuid>,
}

/// Handles the publish-completed webhook.
///
/// Authentication runs in middleware before this handler.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 405: Method other than POST
/// - 400: Body is not a webhook payload
/// - 500: An item lookup failed and the batch policy aborted
#[instrument(
    name = "publish_end",
    skip(method, state, body),
    fields(method = %method, content_length = body.len())
)]
pub async fn publish_end(
    method: Method,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if method != Method::POST {
        warn!("Rejected webhook with unsupported method");
        return Err(PubsyncError::MethodNotAllowed { method: method.to_string() }.into());
    }

    let payload = WebhookPayload::from_slice(&body).inspect_err(|e| {
        warn!(error = %e, "Rejected malformed webhook payload");
    })?;

    info!(updates = payload.updates.len(), "Processing publish webhook");

    let batch = resolve_batch(&state, &payload).await?;

    let outcome = if batch.actionable == 0 {
        PushOutcome::Skipped
    } else {
        state.index.push(&batch.items).await
    };
    outcome.record();

    info!(
        resolved = batch.items.len(),
        skipped = batch.skipped,
        failed = batch.failed.len(),
        "Publish webhook processed"
    );

    let response = PublishResponse {
        message: "Webhook event received",
        resolved: batch.items.len(),
        skipped: batch.skipped,
        pushed: outcome.is_delivered(),
        failed: batch.failed.into_iter().map(|guid| guid.0).collect(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Resolves every `LayoutData` update in `payload`, in order.
async fn resolve_batch(
    state: &AppState,
    payload: &WebhookPayload,
) -> Result<ResolvedBatch, PubsyncError> {
    let site_root = state.config.site_root_path.as_str();
    let policy = state.config.batch_failure_policy;
    let mut batch = ResolvedBatch::default();

    for update in payload.layout_updates() {
        batch.actionable += 1;
        let guid = update.guid();

        match state.graphql.fetch_item(&guid).await {
            Ok(Some(item)) if item.is_under(site_root) => {
                debug!(guid = %guid, path = %item.path, "Item resolved");
                batch.items.push(item);
            },
            Ok(Some(item)) => {
                debug!(guid = %guid, path = %item.path, "Item outside site root, skipping");
                batch.skipped += 1;
            },
            Ok(None) => {
                debug!(guid = %guid, "Item not found, skipping");
                batch.skipped += 1;
            },
            Err(e) => {
                let error = PubsyncError::from(e);
                match policy.on_item_failure(&guid, &error) {
                    ItemFailureAction::Abort => {
                        return Err(PubsyncError::item_resolution(guid.0, error));
                    },
                    ItemFailureAction::Continue => batch.failed.push(guid),
                }
            },
        }
    }

    Ok(batch)
}
