//! Utility modules for curator
//!
//! ## Module Organization
//!
//! - **error**: Error type, circuit breaker, and retry
//! - **logging**: Subscriber setup
//! - **net**: HTTP client, rate limiting, and the resilient client
//! - **sys**: Injectable clocks

pub mod error;
pub mod logging;
pub mod net;
pub mod sys;

// Re-export commonly used types from each module for convenience
pub use error::{CuratorError, Result};
pub use net::{RateLimiter, ResilientClient};
pub use sys::{Clock, MockClock, SharedClock, SystemClock};
