//! Rate limiting types

use std::time::Duration;

/// Rate limit configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum admissions inside one window
    pub max_requests: usize,
    /// Length of the trailing window
    pub window: Duration,
    /// Interval between admission checks while waiting
    pub poll_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 40,
            window: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}
