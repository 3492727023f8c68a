//! Rate limiting utilities
//!
//! This module provides a strict sliding-window rate limiter: at most `N`
//! admissions inside any trailing window of duration `W`.

// Module declarations
mod limiter;
mod types;
mod window;


// Re-exports
pub use limiter::RateLimiter;
pub use types::RateLimitConfig;
pub use window::SlidingWindow;
