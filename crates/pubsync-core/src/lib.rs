//! Core domain models and request translation.
//!
//! Provides the transient, request-scoped types shared by the publish webhook
//! and the two proxies: webhook payloads, content items, search parameters,
//! the taxonomy filter builder, the date stamp used to version outbound index
//! API calls, and the error taxonomy with its HTTP status mapping.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod filter;
pub mod models;
pub mod policy;
pub mod search;
pub mod time;

pub use error::{PubsyncError, Result, Upstream};
pub use filter::{build_filter, Taxonomy, TaxonomyFilterBuilder, TAXONOMIES};
pub use models::{
    ContentItem, CrawlRequest, GraphQLRequest, ItemField, ItemGuid, ItemUrl, UpdateNotification,
    WebhookPayload,
};
pub use policy::{BatchFailurePolicy, ItemFailureAction, ProxyFailurePolicy, PushOutcome};
pub use search::{SearchParams, SearchQuery, SortClause, SortDirection};
pub use time::{date_stamp, Clock, RealClock, TestClock};
