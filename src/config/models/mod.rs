//! Configuration data models
//!
//! This module defines all configuration structures used by curator.

#![allow(missing_docs)]

pub mod cache;
pub mod catalog;
pub mod curator;
pub mod lock;
pub mod logging;
pub mod rate_limit;
pub mod resilience;

// Re-export all configuration types
pub use cache::*;
pub use catalog::*;
pub use curator::*;
pub use lock::*;
pub use logging::*;
pub use rate_limit::*;
pub use resilience::*;

/// Default requests admitted per window
pub fn default_max_requests() -> usize {
    40
}

/// Default rate-limit window in seconds
pub fn default_window_secs() -> u64 {
    10
}

pub fn default_failure_threshold() -> u32 {
    5
}

/// Default breaker cool-down in seconds
pub fn default_breaker_timeout_secs() -> u64 {
    60
}

/// Default maximum retry attempts
pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_base_delay_ms() -> u64 {
    2_000
}

pub fn default_max_delay_ms() -> u64 {
    30_000
}

/// Default job lock timeout in seconds
pub fn default_lock_timeout_secs() -> u64 {
    300
}

pub fn default_lock_dir() -> Option<std::path::PathBuf> {
    Some(std::env::temp_dir().join("curator-locks"))
}

pub fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

pub fn default_sweep_interval_secs() -> u64 {
    30 * 60
}

pub fn default_catalog_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

/// Default request timeout in seconds
pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_log_level() -> String {
    "info".to_string()
}
