//! Network and Client utilities
//!
//! This module provides HTTP client construction, rate limiting, and the
//! resilient client that composes them with the recovery primitives.

pub mod client;
pub mod limiter;

// Re-export commonly used types and functions
pub use client::{ClientUtils, HttpClientConfig, ResilientClient};
pub use limiter::{RateLimitConfig, RateLimiter};
