//! Error types for outbound calls.
//!
//! Distinguishes transport failures (non-2xx), GraphQL protocol failures
//! (non-empty `errors`), connection failures and undecodable bodies, and
//! converts each into the service-wide error taxonomy.

use pubsync_core::{PubsyncError, Upstream};
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the content graph and index API clients.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Upstream answered with a non-success status.
    #[error("{service} request failed: {status} {reason}")]
    Transport {
        /// Service that answered
        service: Upstream,
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// GraphQL response carried errors.
    #[error("GraphQL request failed: {}", .messages.join(", "))]
    GraphQl {
        /// Error messages in response order
        messages: Vec<String>,
    },

    /// Connection-level failure.
    #[error("network connection to {service} failed: {message}")]
    Network {
        /// Service that could not be reached
        service: Upstream,
        /// Error message describing the failure
        message: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("{service} returned an undecodable body: {message}")]
    Decode {
        /// Service that answered
        service: Upstream,
        /// Decoder error message
        message: String,
    },

    /// Client could not be built from its configuration.
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl ClientError {
    /// Creates a transport error from a response status.
    pub fn transport(service: Upstream, status: reqwest::StatusCode) -> Self {
        Self::Transport {
            service,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// Creates a network error.
    pub fn network(service: Upstream, message: impl Into<String>) -> Self {
        Self::Network { service, message: message.into() }
    }

    /// Creates a decode error.
    pub fn decode(service: Upstream, message: impl Into<String>) -> Self {
        Self::Decode { service, message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}

impl From<ClientError> for PubsyncError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Transport { service, status, reason } => {
                Self::UpstreamTransport { service, status, reason }
            },
            ClientError::GraphQl { messages } => {
                Self::UpstreamProtocol { messages: messages.join(", ") }
            },
            ClientError::Network { service, message } | ClientError::Decode { service, message } => {
                Self::UpstreamUnavailable { service, message }
            },
            ClientError::Configuration { message } => {
                Self::Other(anyhow::anyhow!("invalid client configuration: {message}"))
            },
        }
    }
}
