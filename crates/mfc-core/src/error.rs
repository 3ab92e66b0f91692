//! # Core Error Types
//!
//! The shared error taxonomy for foundational types. Component-specific
//! errors (template normalization, lifecycle transitions, API transport)
//! live next to their components; this module only carries the errors
//! the foundational types themselves can produce.
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Errors produced by the foundational types in `mfc-core`.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Timestamp string could not be parsed or violated the UTC-only rule.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Identifier string was not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
