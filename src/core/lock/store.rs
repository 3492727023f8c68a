//! Lock storage abstraction

use super::name::LockName;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::time::{Duration, SystemTime};

/// Holder metadata written into a lock: acquisition time and process id
///
/// Informational only; exclusion never depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    pub acquired_at: DateTime<Utc>,
    pub pid: Option<u32>,
}

impl LockInfo {
    /// Metadata for a lock taken by this process at `now`
    pub fn current(now: SystemTime) -> Self {
        Self {
            acquired_at: DateTime::<Utc>::from(now),
            pid: Some(std::process::id()),
        }
    }

    /// Two lines: unix timestamp, then pid
    pub fn encode(&self) -> String {
        match self.pid {
            Some(pid) => format!("{}\n{}\n", self.acquired_at.timestamp(), pid),
            None => format!("{}\n\n", self.acquired_at.timestamp()),
        }
    }

    pub fn parse(content: &str) -> Option<Self> {
        let mut lines = content.lines();
        let timestamp = lines.next()?.trim().parse::<i64>().ok()?;
        let acquired_at = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        let pid = lines.next().and_then(|line| line.trim().parse::<u32>().ok());
        Some(Self { acquired_at, pid })
    }

    /// Age at `now`; zero when the holder's clock is ahead of ours
    pub fn age(&self, now: SystemTime) -> Duration {
        (DateTime::<Utc>::from(now) - self.acquired_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Result of a stale-lock check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// The lock was stale and has been removed
    Reclaimed { age: Duration, holder: Option<LockInfo> },
    /// The lock disappeared before it could be inspected
    Vanished,
    /// The lock is live
    Held { age: Duration },
}

/// Backing storage for exclusive locks
///
/// Implementations must make `try_create` atomic: of several concurrent
/// callers for one name, at most one gets `true`.
pub trait LockStore: Send + Sync + Debug {
    /// Create the lock for `name`; `Ok(false)` when it already exists
    fn try_create(&self, name: &LockName, info: &LockInfo) -> Result<bool>;

    /// Remove the lock if it is older than `max_age` at `now`
    fn reclaim_if_stale(
        &self,
        name: &LockName,
        max_age: Duration,
        now: SystemTime,
    ) -> Result<ReclaimOutcome>;

    /// Remove the lock; a missing lock is not an error
    fn remove(&self, name: &LockName) -> Result<()>;

    /// Current holder, `None` when the lock is free
    fn read(&self, name: &LockName) -> Result<Option<LockInfo>>;
}
