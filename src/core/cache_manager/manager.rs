//! Expiring cache implementation
//!
//! One mutex guards the map. Reads drop expired entries on the spot, so an
//! expired value is never returned even when no sweep has run yet.

use super::types::{AtomicCacheStats, CacheConfig, CacheEntry, CacheStats};
use crate::utils::error::{CuratorError, Result};
use crate::utils::sys::{SharedClock, system_clock};
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

struct Shared<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    clock: SharedClock,
    stats: AtomicCacheStats,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

/// TTL map with lazy expiry and an optional periodic sweep
///
/// The sweep task is owned by the cache: `close` stops it, and so does
/// dropping the cache.
pub struct ExpiringCache<K, V> {
    shared: Arc<Shared<K, V>>,
    config: CacheConfig,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Create a new cache on the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Create a new cache on the given clock
    pub fn with_clock(config: CacheConfig, clock: SharedClock) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                clock,
                stats: AtomicCacheStats::default(),
            }),
            config,
            sweeper: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let now = self.shared.clock.now();
        self.shared
            .entries
            .lock()
            .insert(key, CacheEntry::new(value, now, ttl));
    }

    /// Store `value` under `key` for the configured default TTL
    pub fn insert(&self, key: K, value: V) {
        self.set(key, value, self.config.default_ttl);
    }

    /// Look up a live entry; an expired hit is removed and reported as a miss
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.shared.clock.now();
        let mut entries = self.shared.entries.lock();
        let stats = &self.shared.stats;

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            stats.expired_on_read.fetch_add(1, Ordering::Relaxed);
        }
        stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared
            .entries
            .lock()
            .remove(key)
            .map(|entry| entry.value)
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.shared.entries.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry now, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.shared.cleanup_expired();
        if removed > 0 {
            self.shared
                .stats
                .swept
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Removed {} expired cache entries", removed);
        }
        removed
    }

    /// Get cache statistics (lock-free snapshot)
    pub fn stats(&self) -> CacheStats {
        self.shared.stats.snapshot()
    }

    /// Spawn the periodic sweep on the current tokio runtime
    ///
    /// A sweep already running is replaced.
    pub fn start_sweeper(&self, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(CuratorError::config("cache sweep interval must be non-zero"));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CuratorError::Internal(format!("cache sweeper needs a runtime: {e}")))?;

        let shared = Arc::clone(&self.shared);
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = shared.cleanup_expired();
                if removed > 0 {
                    shared.stats.swept.fetch_add(removed as u64, Ordering::Relaxed);
                    info!("Cache sweep removed {} expired entries", removed);
                }
            }
        });

        if let Some(previous) = self.sweeper.lock().replace(handle) {
            previous.abort();
        }
        debug!("Cache sweeper started with period {:?}", period);
        Ok(())
    }

    /// Start the sweep with the configured interval
    pub fn start_default_sweeper(&self) -> Result<()> {
        self.start_sweeper(self.config.sweep_interval)
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the background sweep; entries stay readable
    pub fn close(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            debug!("Cache sweeper stopped");
        }
    }
}

impl<K, V> Drop for ExpiringCache<K, V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

impl<K, V> std::fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("entries", &self.shared.entries.lock().len())
            .field("config", &self.config)
            .finish()
    }
}
