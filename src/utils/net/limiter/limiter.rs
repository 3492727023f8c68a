//! Core RateLimiter implementation
//!
//! This module contains the main RateLimiter struct and its core methods.

use crate::utils::error::{Cancelled, CuratorError, Result};
use crate::utils::sys::{SharedClock, system_clock};
use parking_lot::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::RateLimitConfig;
use super::window::SlidingWindow;

/// Rate limiter implementation
///
/// Pruning and admission happen under one lock, so concurrent callers never
/// see more than `max_requests` admissions inside a window.
#[derive(Debug)]
pub struct RateLimiter {
    /// Sliding window for request counting
    pub(super) window: Mutex<SlidingWindow>,
    pub(super) clock: SharedClock,
    pub(super) poll_interval: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter admitting `max_requests` per `window`
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self::from_config(RateLimitConfig {
            max_requests,
            window,
            ..Default::default()
        })
    }

    pub fn from_config(config: RateLimitConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Create a rate limiter on the given clock
    pub fn with_clock(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self {
            window: Mutex::new(SlidingWindow::new(config.max_requests, config.window)),
            clock,
            poll_interval: config.poll_interval,
        }
    }

    /// Non-blocking admission check
    ///
    /// Records the call when admitted; a rejection leaves no trace.
    pub fn allow(&self) -> bool {
        let now = self.clock.now();
        self.window.lock().try_admit(now)
    }

    /// Wait until admitted, polling every `poll_interval`
    ///
    /// Returns `CuratorError::Cancelled` as soon as `cancel` fires.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<()> {
        let mut logged = false;
        loop {
            if self.allow() {
                return Ok(());
            }

            if !logged {
                debug!(
                    "Rate limit reached, waiting up to {:?} for a slot",
                    self.retry_after().unwrap_or(self.poll_interval)
                );
                logged = true;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(CuratorError::from(Cancelled::new("rate limit wait")));
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Admissions still available in the current window
    pub fn remaining(&self) -> usize {
        let now = self.clock.now();
        self.window.lock().remaining(now)
    }

    /// Time until the next slot frees up, `None` when one is free now
    pub fn retry_after(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.window.lock().retry_after(now)
    }
}
