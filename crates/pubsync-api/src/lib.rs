//! HTTP surface of pubsync.
//!
//! Three handlers sit between the CMS and the index API: the publish webhook
//! (`/api/onPublishEnd`), the crawl proxy (`/api/crawl`) and the query proxy
//! (`/api/query`). All of them share one [`AppState`] built from [`Config`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use anyhow::Context;
use pubsync_client::{GraphQLClient, IndexClient};
use pubsync_core::Clock;

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared state handed to every handler.
///
/// Cloning is cheap: the configuration and clock are reference counted and
/// both clients share a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<Config>,
    /// Content graph client
    pub graphql: GraphQLClient,
    /// Index API client
    pub index: IndexClient,
    /// Clock for timestamps and date stamps
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Builds the outbound clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either client rejects its configuration.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let graphql = GraphQLClient::new(config.to_graphql_config())
            .context("Failed to create content graph client")?;
        let index = IndexClient::new(config.to_index_config(), clock.clone())
            .context("Failed to create index API client")?;

        Ok(Self { config: Arc::new(config), graphql, index, clock })
    }
}
