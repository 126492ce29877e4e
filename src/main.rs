//! pubsync service.
//!
//! Main entry point: loads configuration, initializes tracing from its
//! `rust_log` directives, builds the outbound clients and serves the webhook
//! and proxy routes until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use pubsync_api::{AppState, Config};
use pubsync_core::RealClock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.rust_log);

    info!("Starting pubsync service");
    info!(
        host = %config.host,
        port = config.port,
        content_graph = %config.content_graph_endpoint,
        content_graph_api_key = Config::mask_secret(&config.content_graph_api_key),
        index_ingest = %config.index_ingest_endpoint,
        index_search = %config.index_search_endpoint,
        webhook_api_key = Config::mask_secret(&config.webhook_api_key),
        crawl_api_key = Config::mask_secret(&config.crawl_api_key),
        site_root = %config.site_root_path,
        batch_failure_policy = ?config.batch_failure_policy,
        proxy_failure_policy = ?config.proxy_failure_policy,
        "Configuration loaded"
    );

    for secret in config.missing_secrets() {
        warn!(secret, "Secret not configured, dependent routes will reject or fail");
    }
    if config.index_ingest_endpoint.is_empty() {
        warn!("INDEX_INGEST_ENDPOINT not configured, publish webhooks will not be pushed");
    }

    let addr = config.parse_server_addr()?;
    let state = AppState::new(config, Arc::new(RealClock::new()))?;

    pubsync_api::start_server(state, addr).await.context("Server failed")?;

    info!("pubsync shutdown complete");
    Ok(())
}

/// Initializes tracing with the configured filter directives.
fn init_tracing(directives: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = log_filter(directives);

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Parses `RUST_LOG`-style directives, falling back to `info` when they are
/// invalid.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}
