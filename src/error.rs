//! Error types for the context cache
//!
//! Cache operations themselves never fail: a lookup that cannot be served
//! degrades to a miss. These errors cover the fallible edges around the
//! cache, namely configuration and the JSON handshake with durable storage.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable present but not parseable
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: String, value: String },

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}
