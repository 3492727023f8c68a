//! Lock-guarded job execution

use crate::core::lock::ExclusiveLock;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What happened to a job run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome<T> {
    /// The job ran to completion under its lock
    Completed(T),
    /// Another instance holds the lock; nothing was done
    AlreadyRunning,
}

impl<T> JobOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            JobOutcome::Completed(value) => Some(value),
            JobOutcome::AlreadyRunning => None,
        }
    }
}

/// Releases the lock if the job future is dropped or panics
struct ReleaseOnDrop<'a> {
    lock: &'a ExclusiveLock,
    key: &'a str,
    armed: bool,
}

impl ReleaseOnDrop<'_> {
    fn release(mut self) -> Result<()> {
        self.armed = false;
        self.lock.release(self.key)
    }
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.lock.release(self.key) {
                warn!("Failed to release lock {} after aborted job: {}", self.key, e);
            }
        }
    }
}

/// Runs jobs under their exclusive lock
#[derive(Debug, Clone)]
pub struct JobRunner {
    lock: ExclusiveLock,
}

impl JobRunner {
    pub fn new(lock: ExclusiveLock) -> Self {
        Self { lock }
    }

    pub fn lock(&self) -> &ExclusiveLock {
        &self.lock
    }

    /// Acquire `key` within `timeout`, run `job`, release the lock
    ///
    /// Contention yields `JobOutcome::AlreadyRunning`. The lock is released
    /// whether the job succeeds or fails; a job error takes precedence over a
    /// release error.
    pub async fn run<T, F, Fut>(
        &self,
        key: &str,
        timeout: Duration,
        cancel: &CancellationToken,
        job: F,
    ) -> Result<JobOutcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self
            .lock
            .try_acquire_with_cancel(key, timeout, cancel)
            .await?
        {
            info!("Job {} is already in progress, skipping", key);
            return Ok(JobOutcome::AlreadyRunning);
        }

        let guard = ReleaseOnDrop {
            lock: &self.lock,
            key,
            armed: true,
        };
        info!("Job {} started", key);
        let result = job().await;
        let released = guard.release();

        match (result, released) {
            (Ok(value), Ok(())) => {
                info!("Job {} finished", key);
                Ok(JobOutcome::Completed(value))
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), released) => {
                if let Err(release_err) = released {
                    warn!("Failed to release lock {}: {}", key, release_err);
                }
                warn!("Job {} failed: {}", key, e);
                Err(e)
            }
        }
    }
}
