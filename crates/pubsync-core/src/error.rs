//! Error taxonomy for webhook and proxy operations.
//!
//! Every failure carries a stable code for client disambiguation and maps to
//! exactly one HTTP status. Auth, method and parse failures are produced
//! locally; upstream failures are converted from the client crate.

use std::fmt;

use thiserror::Error;

/// Result type alias using `PubsyncError`.
pub type Result<T> = std::result::Result<T, PubsyncError>;

/// External service an upstream failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// The CMS content graph (GraphQL).
    ContentGraph,
    /// The search/listings index API.
    IndexApi,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentGraph => write!(f, "content graph"),
            Self::IndexApi => write!(f, "index API"),
        }
    }
}

/// Pubsync error types with stable codes.
#[derive(Debug, Error)]
pub enum PubsyncError {
    // Request errors (E1001-E1004)
    /// Webhook API key missing or wrong (E1001).
    #[error("[E1001] Unauthorized: api_key missing or invalid")]
    Unauthorized,

    /// Crawl API key missing or wrong (E1002).
    #[error("[E1002] Forbidden: api_key missing or invalid")]
    Forbidden,

    /// Request used an unsupported HTTP method (E1003).
    #[error("[E1003] Method not allowed: {method}")]
    MethodNotAllowed {
        /// The method the request arrived with
        method: String,
    },

    /// Body did not parse or failed the shape check (E1004).
    #[error("[E1004] Bad Request: {reason}")]
    MalformedRequest {
        /// Why the body was rejected
        reason: String,
    },

    // Upstream errors (E2001-E2004)
    /// Upstream answered with a non-success status (E2001).
    #[error("[E2001] Upstream transport failure: {service} returned {status} {reason}")]
    UpstreamTransport {
        /// Service that failed
        service: Upstream,
        /// HTTP status returned by the service
        status: u16,
        /// Status text or response excerpt
        reason: String,
    },

    /// GraphQL response carried a non-empty `errors` array (E2002).
    #[error("[E2002] Upstream protocol failure: {messages}")]
    UpstreamProtocol {
        /// All GraphQL error messages joined with `, `
        messages: String,
    },

    /// Upstream was unreachable or sent an undecodable body (E2003).
    #[error("[E2003] Upstream unavailable: {service}: {message}")]
    UpstreamUnavailable {
        /// Service that failed
        service: Upstream,
        /// Connection or decode failure detail
        message: String,
    },

    /// A webhook item could not be resolved and the batch was aborted (E2004).
    #[error("[E2004] Internal Server Error: GraphQL query failed for item {guid}")]
    ItemResolution {
        /// GUID of the item whose lookup failed
        guid: String,
        /// Underlying upstream failure
        #[source]
        source: Box<PubsyncError>,
    },

    /// Generic error for wrapping other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PubsyncError {
    /// Creates a malformed request error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest { reason: reason.into() }
    }

    /// Wraps an upstream failure that aborted webhook item resolution.
    pub fn item_resolution(guid: impl Into<String>, source: Self) -> Self {
        Self::ItemResolution { guid: guid.into(), source: Box::new(source) }
    }

    /// Returns the error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "E1001",
            Self::Forbidden => "E1002",
            Self::MethodNotAllowed { .. } => "E1003",
            Self::MalformedRequest { .. } => "E1004",
            Self::UpstreamTransport { .. } => "E2001",
            Self::UpstreamProtocol { .. } => "E2002",
            Self::UpstreamUnavailable { .. } => "E2003",
            Self::ItemResolution { .. } => "E2004",
            Self::Other(_) => "E9999",
        }
    }

    /// Returns the HTTP status code this error is reported with.
    ///
    /// Upstream failures surfaced by a proxy map to 502; a failed webhook
    /// batch is an internal error of this service and maps to 500.
    pub const fn status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::MethodNotAllowed { .. } => 405,
            Self::MalformedRequest { .. } => 400,
            Self::UpstreamTransport { .. }
            | Self::UpstreamProtocol { .. }
            | Self::UpstreamUnavailable { .. } => 502,
            Self::ItemResolution { .. } | Self::Other(_) => 500,
        }
    }
}
