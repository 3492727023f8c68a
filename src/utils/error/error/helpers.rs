//! Helper functions for creating and inspecting errors

use super::types::CuratorError;
use std::time::Duration;

const MAX_BODY_EXCERPT: usize = 200;

impl CuratorError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing(message.into())
    }

    pub fn lock<S: Into<String>>(message: S) -> Self {
        Self::Lock(message.into())
    }

    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled(message.into())
    }

    pub fn circuit_open<S: Into<String>>(message: S) -> Self {
        Self::CircuitBreaker(message.into())
    }

    /// Build the error for a non-success HTTP status
    ///
    /// Returns `None` for statuses outside the 4xx/5xx ranges.
    pub fn from_status(status: u16, body: &str, retry_after: Option<Duration>) -> Option<Self> {
        let message = excerpt(body);
        match status {
            400..=499 => Some(Self::ClientError {
                status,
                message,
                retry_after,
            }),
            500..=599 => Some(Self::ServerError {
                status,
                message,
                retry_after,
            }),
            _ => None,
        }
    }

    /// Whether the error means the call was refused before any attempt was made
    pub fn is_admission_denied(&self) -> bool {
        matches!(self, Self::CircuitBreaker(_) | Self::Cancelled(_))
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitBreaker(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } | Self::ClientError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match trimmed.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
