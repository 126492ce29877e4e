//! Failure policies for the webhook and proxy pipelines.
//!
//! The pipelines treat three kinds of failure differently: a failed item
//! lookup during webhook resolution, a failed upstream call in a proxy, and
//! a failed ingest push. Each treatment is a named value here so it can be
//! swapped in configuration without touching the handlers.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::PubsyncError, models::ItemGuid};

/// What to do with the rest of a webhook batch after one item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFailureAction {
    /// Stop resolving and fail the webhook with 500
    Abort,
    /// Record the failure and keep resolving
    Continue,
}

/// Policy applied when a single webhook item cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchFailurePolicy {
    /// Any failure aborts the whole batch; nothing is pushed.
    #[default]
    AbortBatch,
    /// Failed items are skipped and reported back to the caller.
    SkipFailed,
}

impl BatchFailurePolicy {
    /// Decides how to proceed after `guid` failed to resolve.
    pub fn on_item_failure(self, guid: &ItemGuid, error: &PubsyncError) -> ItemFailureAction {
        match self {
            Self::AbortBatch => {
                warn!(guid = %guid, error = %error, "Item lookup failed, aborting batch");
                ItemFailureAction::Abort
            },
            Self::SkipFailed => {
                warn!(guid = %guid, error = %error, "Item lookup failed, skipping item");
                ItemFailureAction::Continue
            },
        }
    }
}

/// Policy applied when a proxy's upstream call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyFailurePolicy {
    /// Log and answer 200 with a JSON `null` body.
    #[default]
    BestEffort,
    /// Answer with the structured error and its status.
    Surface,
}

/// Result of the fire-and-forget ingest push.
///
/// Handlers only ever log this value; it never changes the webhook response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Index API accepted the batch.
    Delivered {
        /// HTTP status returned
        status: u16,
        /// Number of items pushed
        items: usize,
    },
    /// Index API answered with a non-success status.
    Rejected {
        /// HTTP status returned
        status: u16,
        /// Response body excerpt
        body: String,
    },
    /// The push never got a response.
    Failed {
        /// Transport failure detail
        message: String,
    },
    /// Nothing was actionable, so no push was attempted.
    Skipped,
}

impl PushOutcome {
    /// Returns whether the index API accepted the push.
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Logs the outcome. This is the only thing handlers do with it.
    pub fn record(&self) {
        match self {
            Self::Delivered { status, items } => {
                info!(status, items, "Pushed items to index API");
            },
            Self::Rejected { status, body } => {
                warn!(status, body = %body, "Index API rejected push");
            },
            Self::Failed { message } => {
                warn!(error = %message, "Index API push failed");
            },
            Self::Skipped => {
                info!("No actionable updates, index push skipped");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policies_match_legacy_behavior() {
        assert_eq!(BatchFailurePolicy::default(), BatchFailurePolicy::AbortBatch);
        assert_eq!(ProxyFailurePolicy::default(), ProxyFailurePolicy::BestEffort);
    }

    #[test]
    fn batch_policy_decides_abort_or_continue() {
        let guid = ItemGuid("11112222".to_string());
        let error = PubsyncError::UpstreamProtocol { messages: "boom".to_string() };

        assert_eq!(
            BatchFailurePolicy::AbortBatch.on_item_failure(&guid, &error),
            ItemFailureAction::Abort
        );
        assert_eq!(
            BatchFailurePolicy::SkipFailed.on_item_failure(&guid, &error),
            ItemFailureAction::Continue
        );
    }

    #[test]
    fn policies_deserialize_from_snake_case() {
        let policy: BatchFailurePolicy = serde_json::from_str("\"skip_failed\"").unwrap();
        assert_eq!(policy, BatchFailurePolicy::SkipFailed);

        let policy: ProxyFailurePolicy = serde_json::from_str("\"surface\"").unwrap();
        assert_eq!(policy, ProxyFailurePolicy::Surface);
    }

    #[test]
    fn only_delivered_counts_as_delivered() {
        assert!(PushOutcome::Delivered { status: 200, items: 1 }.is_delivered());
        assert!(!PushOutcome::Rejected { status: 400, body: String::new() }.is_delivered());
        assert!(!PushOutcome::Failed { message: "refused".to_string() }.is_delivered());
        assert!(!PushOutcome::Skipped.is_delivered());
    }
}
