//! Error types shared across relkv crates.

use thiserror::Error;

/// Unified error type for domain-level operations.
#[derive(Debug, Error)]
pub enum RelkvError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown entity kind or malformed name
    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),
}
