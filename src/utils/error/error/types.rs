//! Error types for curator

use std::time::Duration;
use thiserror::Error;

/// Result type alias for curator
pub type Result<T> = std::result::Result<T, CuratorError>;

/// Main error type for curator
#[derive(Error, Debug)]
pub enum CuratorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (bad lock keys, bad arguments)
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Call rejected because the dependency's circuit breaker is open
    #[error("Circuit breaker open: {0}")]
    CircuitBreaker(String),

    /// A blocking wait was abandoned because its cancellation signal fired
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Connection-level failure (refused, reset, timed out)
    #[error("Network error: {0}")]
    Network(String),

    /// The dependency answered with a 5xx status
    #[error("Server error {status}: {message}")]
    ServerError {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    /// The dependency answered with a 4xx status
    #[error("Client error {status}: {message}")]
    ClientError {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    /// Response body could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Lock infrastructure failure (directory, permissions, symlinks)
    #[error("Lock error: {0}")]
    Lock(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
