//! Error recovery and resilience utilities
//!
//! This module provides the circuit breaker and the retry executor used by the resilient client.

mod circuit_breaker;
mod retry;
mod types;

pub use circuit_breaker::CircuitBreaker;
pub use retry::RetryExecutor;
pub use types::{
    Cancelled, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, RetryConfig, Retryable,
};
