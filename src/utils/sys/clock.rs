//! Time sources
//!
//! Every time-aware component (rate limiter, circuit breaker, cache, job
//! lock) reads the time through a [`Clock`] handed to it at construction, so
//! tests can drive time forward deterministically with [`MockClock`].

use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync + Debug {
    /// Monotonic instant, used for windows, cool-downs and TTLs
    fn now(&self) -> Instant;

    /// Wall-clock time, used for lock metadata and lock age
    fn system_now(&self) -> SystemTime;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Clock backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Shared handle to the system clock
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// Manually advanced clock for tests
///
/// Both time lines start at the moment of construction and only move when
/// [`MockClock::advance`] is called.
#[derive(Debug)]
pub struct MockClock {
    base: Instant,
    base_system: SystemTime,
    offset: Mutex<Duration>,
}

impl MockClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            base_system: SystemTime::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Create a shared mock clock
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Total time advanced since construction
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn system_now(&self) -> SystemTime {
        self.base_system + *self.offset.lock()
    }
}
