//! Core building blocks for curator
//!
//! - **cache_manager**: in-memory TTL cache with a background sweep
//! - **lock**: cross-process exclusive locks with stale-holder reclamation

pub mod cache_manager;
pub mod lock;

pub use cache_manager::{CacheConfig, CacheStats, ExpiringCache};
pub use lock::{ExclusiveLock, FileLockStore, LockInfo, LockStore, MemoryLockStore};
