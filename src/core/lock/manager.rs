//! Exclusive lock acquisition
//!
//! Acquisition polls the store until the lock is created, the timeout runs
//! out, or the caller cancels. A lock older than twice the timeout is taken
//! to belong to a crashed holder and is reclaimed on the spot.

use super::file_store::FileLockStore;
use super::memory_store::MemoryLockStore;
use super::name::LockName;
use super::store::{LockInfo, LockStore, ReclaimOutcome};
use crate::utils::error::{Cancelled, CuratorError, Result};
use crate::utils::sys::{SharedClock, system_clock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stand-in deadline for timeouts too large to add to an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Named, timeout-bounded mutual exclusion over a [`LockStore`]
#[derive(Debug, Clone)]
pub struct ExclusiveLock {
    store: Arc<dyn LockStore>,
    clock: SharedClock,
    poll_interval: Duration,
}

impl ExclusiveLock {
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self::with_clock(store, system_clock())
    }

    pub fn with_clock(store: Arc<dyn LockStore>, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Lock files under `base_dir`
    pub fn file(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileLockStore::new(base_dir)))
    }

    /// Process-local locks
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryLockStore::new()))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn store(&self) -> &Arc<dyn LockStore> {
        &self.store
    }

    /// Try to take the lock for `key`, waiting up to `timeout`
    ///
    /// `Ok(false)` means someone else still holds it; errors are reserved for
    /// infrastructure failures and invalid keys.
    pub async fn try_acquire(&self, key: &str, timeout: Duration) -> Result<bool> {
        self.try_acquire_with_cancel(key, timeout, &CancellationToken::new())
            .await
    }

    /// Like [`ExclusiveLock::try_acquire`], abandoning the wait when `cancel` fires
    pub async fn try_acquire_with_cancel(
        &self,
        key: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let name = LockName::new(key)?;
        let stale_after = timeout.saturating_mul(2);
        let started = Instant::now();
        let deadline = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);

        loop {
            let info = LockInfo::current(self.clock.system_now());
            if self.store.try_create(&name, &info)? {
                debug!("Acquired lock {}", name);
                return Ok(true);
            }

            match self
                .store
                .reclaim_if_stale(&name, stale_after, self.clock.system_now())?
            {
                ReclaimOutcome::Reclaimed { age, holder } => {
                    warn!(
                        "Removed stale lock {} (age {:?}, holder pid {:?})",
                        name,
                        age,
                        holder.and_then(|h| h.pid)
                    );
                    continue;
                }
                ReclaimOutcome::Vanished => continue,
                ReclaimOutcome::Held { .. } => {}
            }

            let now = Instant::now();
            if now >= deadline {
                info!("Lock {} is still held after {:?}", name, timeout);
                return Ok(false);
            }

            let pause = self.poll_interval.min(deadline - now);
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(CuratorError::from(Cancelled::new("lock wait")));
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// Release the lock for `key`; releasing a free lock is not an error
    pub fn release(&self, key: &str) -> Result<()> {
        let name = LockName::new(key)?;
        self.store.remove(&name)?;
        debug!("Released lock {}", name);
        Ok(())
    }

    /// Current holder of `key`, for diagnostics
    pub fn holder(&self, key: &str) -> Result<Option<LockInfo>> {
        let name = LockName::new(key)?;
        self.store.read(&name)
    }

    pub fn is_locked(&self, key: &str) -> Result<bool> {
        Ok(self.holder(key)?.is_some())
    }
}
