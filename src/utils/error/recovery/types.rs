//! Types and configurations for error recovery patterns

use std::time::Duration;
use thiserror::Error;

/// Circuit breaker state, as observed from outside the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, a single probe request decides recovery
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        write!(f, "{s}")
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Cool-down before an open circuit admits a probe
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Circuit breaker metrics
#[derive(Debug, Clone)]
pub struct CircuitBreakerMetrics {
    /// Current circuit breaker state
    pub state: CircuitState,
    /// Number of consecutive failures
    pub consecutive_failures: u32,
    /// Successes recorded since construction or reset
    pub total_successes: u64,
    /// Failures recorded since construction or reset
    pub total_failures: u64,
    /// Calls turned away by `can_execute`
    pub rejected_calls: u64,
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    /// Whether the failure is transient
    fn is_retryable(&self) -> bool;

    /// Delay requested by the dependency itself (`Retry-After`)
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// A wait was abandoned because its cancellation token fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cancelled during {during}")]
pub struct Cancelled {
    during: &'static str,
}

impl Cancelled {
    pub fn new(during: &'static str) -> Self {
        Self { during }
    }

    /// Name of the wait that was interrupted
    pub fn during(&self) -> &'static str {
        self.during
    }
}
