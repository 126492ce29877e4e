//! Configuration management for the pubsync service.

use std::{net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use pubsync_client::{GraphQLConfig, IndexConfig};
use pubsync_core::{BatchFailurePolicy, ProxyFailurePolicy};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// Field names are the lowercased environment variable names.
///
/// # Example
///
/// ```no_run
/// use pubsync_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    pub port: u16,
    /// Inbound request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    pub request_timeout: u64,

    // Inbound secrets
    /// Shared secret expected in the publish webhook's `api_key` parameter.
    ///
    /// Environment variable: `WEBHOOK_API_KEY`
    pub webhook_api_key: String,
    /// Shared secret expected in the crawl proxy's `api_key` parameter.
    ///
    /// Environment variable: `CRAWL_API_KEY`
    pub crawl_api_key: String,

    // Content graph
    /// GraphQL endpoint URL.
    ///
    /// Environment variable: `CONTENT_GRAPH_ENDPOINT`
    pub content_graph_endpoint: String,
    /// GraphQL API key.
    ///
    /// Environment variable: `CONTENT_GRAPH_API_KEY`
    pub content_graph_api_key: String,
    /// Header the GraphQL API key is sent in.
    ///
    /// Environment variable: `CONTENT_GRAPH_API_KEY_HEADER`
    pub content_graph_api_key_header: String,
    /// Language content items are resolved in.
    ///
    /// Environment variable: `CONTENT_LANGUAGE`
    pub content_language: String,
    /// Default root item for the crawl proxy.
    ///
    /// Environment variable: `CRAWL_ROOT_ITEM`
    pub crawl_root_item: String,
    /// Path prefix resolved items must start with to be indexed.
    ///
    /// Environment variable: `SITE_ROOT_PATH`
    pub site_root_path: String,

    // Index API
    /// Bulk ingest endpoint URL.
    ///
    /// Environment variable: `INDEX_INGEST_ENDPOINT`
    pub index_ingest_endpoint: String,
    /// Bulk ingest API key.
    ///
    /// Environment variable: `INDEX_INGEST_API_KEY`
    pub index_ingest_api_key: String,
    /// Entity search endpoint URL.
    ///
    /// Environment variable: `INDEX_SEARCH_ENDPOINT`
    pub index_search_endpoint: String,
    /// Entity search API key.
    ///
    /// Environment variable: `INDEX_SEARCH_API_KEY`
    pub index_search_api_key: String,
    /// Entity type searched by the query proxy.
    ///
    /// Environment variable: `INDEX_ENTITY_TYPES`
    pub index_entity_types: String,

    // Policies
    /// What a failed item lookup does to a webhook batch.
    ///
    /// Environment variable: `BATCH_FAILURE_POLICY`
    pub batch_failure_policy: BatchFailurePolicy,
    /// What a failed upstream call does to a proxy response.
    ///
    /// Environment variable: `PROXY_FAILURE_POLICY`
    pub proxy_failure_policy: ProxyFailurePolicy,

    // Logging
    /// Tracing filter directives, read before the subscriber is installed.
    ///
    /// Environment variable: `RUST_LOG`
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the content graph client's configuration.
    pub fn to_graphql_config(&self) -> GraphQLConfig {
        GraphQLConfig {
            endpoint: self.content_graph_endpoint.clone(),
            api_key: self.content_graph_api_key.clone(),
            api_key_header: self.content_graph_api_key_header.clone(),
            language: self.content_language.clone(),
        }
    }

    /// Convert to the index API client's configuration.
    pub fn to_index_config(&self) -> IndexConfig {
        IndexConfig {
            ingest_endpoint: self.index_ingest_endpoint.clone(),
            ingest_api_key: self.index_ingest_api_key.clone(),
            search_endpoint: self.index_search_endpoint.clone(),
            search_api_key: self.index_search_api_key.clone(),
            entity_types: self.index_entity_types.clone(),
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Renders a secret for logs without revealing it.
    pub fn mask_secret(secret: &str) -> &'static str {
        if secret.is_empty() {
            "<unset>"
        } else {
            "****"
        }
    }

    /// Names of secrets that are empty and therefore disable something.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        [
            ("WEBHOOK_API_KEY", &self.webhook_api_key),
            ("CRAWL_API_KEY", &self.crawl_api_key),
            ("CONTENT_GRAPH_API_KEY", &self.content_graph_api_key),
            ("INDEX_INGEST_API_KEY", &self.index_ingest_api_key),
            ("INDEX_SEARCH_API_KEY", &self.index_search_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Url::parse(&self.content_graph_endpoint).context("content_graph_endpoint is not a URL")?;
        Url::parse(&self.index_search_endpoint).context("index_search_endpoint is not a URL")?;

        if !self.index_ingest_endpoint.is_empty() {
            Url::parse(&self.index_ingest_endpoint)
                .context("index_ingest_endpoint is not a URL")?;
        }

        if self.site_root_path.is_empty() {
            anyhow::bail!("site_root_path must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let graphql = GraphQLConfig::default();
        let index = IndexConfig::default();

        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout: 30,
            webhook_api_key: String::new(),
            crawl_api_key: String::new(),
            content_graph_endpoint: graphql.endpoint,
            content_graph_api_key: graphql.api_key,
            content_graph_api_key_header: graphql.api_key_header,
            content_language: graphql.language,
            crawl_root_item: String::new(),
            site_root_path: "/sitecore/content".to_string(),
            index_ingest_endpoint: index.ingest_endpoint,
            index_ingest_api_key: index.ingest_api_key,
            index_search_endpoint: index.search_endpoint,
            index_search_api_key: index.search_api_key,
            index_entity_types: index.entity_types,
            batch_failure_policy: BatchFailurePolicy::default(),
            proxy_failure_policy: ProxyFailurePolicy::default(),
            rust_log: "info".to_string(),
        }
    }
}
