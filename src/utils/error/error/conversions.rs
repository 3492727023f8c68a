//! Conversions and retry classification for CuratorError

use super::types::CuratorError;
use crate::utils::error::recovery::{Cancelled, Retryable};
use std::time::Duration;

impl From<Cancelled> for CuratorError {
    fn from(err: Cancelled) -> Self {
        CuratorError::Cancelled(err.to_string())
    }
}

impl Retryable for CuratorError {
    /// Connection failures and 5xx answers are transient. A 4xx answer is only
    /// retried when the dependency told us when to come back.
    fn is_retryable(&self) -> bool {
        match self {
            CuratorError::Network(_) | CuratorError::ServerError { .. } => true,
            CuratorError::ClientError { retry_after, .. } => retry_after.is_some(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CuratorError::ServerError { retry_after, .. }
            | CuratorError::ClientError { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
