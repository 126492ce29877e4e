//! Outbound clients for the content graph and the index API.
//!
//! Both clients wrap a pooled `reqwest::Client` and perform exactly one
//! request per call. There are no retries and no explicit timeouts beyond
//! the transport defaults.
//!
//! # Example
//!
//! ```no_run
//! use pubsync_client::{GraphQLClient, GraphQLConfig};
//! use pubsync_core::ItemGuid;
//!
//! # async fn example() -> pubsync_client::Result<()> {
//! let client = GraphQLClient::new(GraphQLConfig {
//!     endpoint: "https://edge.example.com/api/graphql/v1".to_string(),
//!     api_key: "secret".to_string(),
//!     ..GraphQLConfig::default()
//! })?;
//!
//! let item = client.fetch_item(&ItemGuid("11112222".to_string())).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod graphql;
pub mod index;

pub use error::{ClientError, Result};
pub use graphql::{GraphQLClient, GraphQLConfig};
pub use index::{IndexClient, IndexConfig};

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("pubsync/", env!("CARGO_PKG_VERSION"));
