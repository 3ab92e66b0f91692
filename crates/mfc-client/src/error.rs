//! Fleet API client error types.
//!
//! Every variant carries the endpoint label that produced it, and every
//! variant is `Clone`: a deduplicated in-flight request shares its
//! outcome with all waiters, so failures must be as shareable as
//! successes. `reqwest` errors are flattened to strings at the boundary
//! for that reason.

use mfc_template::TemplateError;

use crate::config::ConfigError;

/// Errors from fleet compliance API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failure (connection refused, DNS, TLS).
    #[error("transport error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("timeout calling {endpoint}")]
    Timeout { endpoint: String },

    /// The backend returned 404 for the addressed resource.
    #[error("{endpoint}: not found")]
    NotFound { endpoint: String },

    /// The backend rejected a submit with 409 (already submitted).
    #[error("{endpoint} returned 409: {body}")]
    Conflict { endpoint: String, body: String },

    /// The backend returned any other non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Backend {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },

    /// A fetched template could not be normalized.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, timeouts, and 5xx responses are transient;
    /// everything else reflects request content or resource state.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify a `reqwest` send failure for the given endpoint.
    pub(crate) fn from_send(endpoint: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else {
            Self::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        }
    }
}
