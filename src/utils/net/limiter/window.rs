//! Sliding window rate limiting implementation
//!
//! This module contains the timestamp bookkeeping behind the rate limiter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding window over admission timestamps, oldest first
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    /// Window size
    pub window_size: Duration,
    /// Quota inside one window
    pub max_requests: usize,
    /// Admission timestamps
    requests: VecDeque<Instant>,
}

impl SlidingWindow {
    pub fn new(max_requests: usize, window_size: Duration) -> Self {
        Self {
            window_size,
            max_requests,
            requests: VecDeque::with_capacity(max_requests),
        }
    }

    /// Drop timestamps that are no longer inside the window ending at `now`
    pub fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.requests.front() {
            if now.saturating_duration_since(oldest) >= self.window_size {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }

    /// Prune, then record `now` if the quota allows it
    pub fn try_admit(&mut self, now: Instant) -> bool {
        self.prune(now);
        if self.requests.len() < self.max_requests {
            self.requests.push_back(now);
            true
        } else {
            false
        }
    }

    /// Admissions left in the window ending at `now`
    pub fn remaining(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.max_requests.saturating_sub(self.requests.len())
    }

    /// Time until the next admission becomes possible, `None` if one is possible now
    pub fn retry_after(&mut self, now: Instant) -> Option<Duration> {
        self.prune(now);
        if self.requests.len() < self.max_requests {
            return None;
        }
        self.requests
            .front()
            .map(|&first| self.window_size.saturating_sub(now.saturating_duration_since(first)))
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
