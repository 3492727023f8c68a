//! In-memory cache with per-entry expiry
//!
//! Entries expire lazily on read and are also removed by an optional
//! background sweep.

pub mod manager;
pub mod types;

#[cfg(test)]
mod tests;

pub use manager::ExpiringCache;
pub use types::{CacheConfig, CacheEntry, CacheStats};
