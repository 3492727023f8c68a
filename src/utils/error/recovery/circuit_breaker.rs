//! Circuit breaker implementation for fault tolerance

use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use crate::utils::sys::{SharedClock, system_clock};
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Internal state; the instants make illegal combinations unrepresentable
#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed,
    /// Opened, or re-armed, by the failure recorded at `since`
    Open { since: Instant },
    /// A probe was admitted at `probe_since` and has not reported back yet
    HalfOpen { probe_since: Instant },
}

impl BreakerState {
    fn public(&self) -> CircuitState {
        match self {
            BreakerState::Closed => CircuitState::Closed,
            BreakerState::Open { .. } => CircuitState::Open,
            BreakerState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    total_successes: u64,
    total_failures: u64,
    rejected_calls: u64,
}

impl BreakerInner {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            last_failure: None,
            total_successes: 0,
            total_failures: 0,
            rejected_calls: 0,
        }
    }
}

/// Circuit breaker implementation
///
/// Closed circuits pass every call. After `failure_threshold` consecutive
/// failures the circuit opens and rejects calls until `timeout` has elapsed
/// since the last failure; then a single probe is admitted. The probe's
/// outcome closes or re-opens the circuit.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
    clock: SharedClock,
}

impl CircuitBreaker {
    /// Create a new circuit breaker on the system clock
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self::with_clock(name, config, system_clock())
    }

    /// Create a new circuit breaker on the given clock
    pub fn with_clock(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner::new()),
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the circuit breaker allows execution
    ///
    /// Performs the `open -> half_open` transition once the cool-down has
    /// elapsed and hands out the single probe slot. A probe that never
    /// reports back is considered abandoned after another full cool-down.
    pub fn can_execute(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { since } => {
                if now.saturating_duration_since(since) >= self.config.timeout {
                    info!(
                        "Circuit breaker '{}' transitioning from Open to HalfOpen",
                        self.name
                    );
                    inner.state = BreakerState::HalfOpen { probe_since: now };
                    true
                } else {
                    inner.rejected_calls += 1;
                    false
                }
            }
            BreakerState::HalfOpen { probe_since } => {
                if now.saturating_duration_since(probe_since) >= self.config.timeout {
                    warn!(
                        "Circuit breaker '{}' probe never reported back, admitting a new probe",
                        self.name
                    );
                    inner.state = BreakerState::HalfOpen { probe_since: now };
                    true
                } else {
                    inner.rejected_calls += 1;
                    false
                }
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        self.succeed(false);
    }

    /// Record a success from the call whose own failure opened the circuit
    ///
    /// The dependency answered within that call, so an open circuit closes.
    /// Successes from calls admitted earlier keep going through
    /// [`CircuitBreaker::record_success`], which leaves an open circuit alone.
    pub fn record_recovery(&self) {
        self.succeed(true);
    }

    fn succeed(&self, opened_by_caller: bool) {
        let mut inner = self.inner.lock();
        inner.total_successes += 1;

        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures = 0;
            }
            BreakerState::HalfOpen { .. } => {
                info!(
                    "Circuit breaker '{}' transitioning from HalfOpen to Closed",
                    self.name
                );
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
            }
            BreakerState::Open { .. } if opened_by_caller => {
                info!(
                    "Circuit breaker '{}' transitioning from Open to Closed, dependency recovered on retry",
                    self.name
                );
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
            }
            // A call admitted before the circuit opened finished late; the
            // cool-down still stands.
            BreakerState::Open { .. } => {
                debug!(
                    "Circuit breaker '{}' ignoring late success while open",
                    self.name
                );
            }
        }
    }

    /// Record a failed call
    ///
    /// Returns `true` when this failure moved the circuit to open.
    pub fn record_failure(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.total_failures += 1;
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        inner.last_failure = Some(now);

        match inner.state {
            BreakerState::Closed => {
                if inner.consecutive_failures >= self.config.failure_threshold.max(1) {
                    warn!(
                        "Circuit breaker '{}' opening after {} consecutive failures",
                        self.name, inner.consecutive_failures
                    );
                    inner.state = BreakerState::Open { since: now };
                    return true;
                }
                false
            }
            BreakerState::HalfOpen { .. } => {
                warn!(
                    "Circuit breaker '{}' transitioning from HalfOpen to Open due to failure",
                    self.name
                );
                inner.state = BreakerState::Open { since: now };
                true
            }
            BreakerState::Open { .. } => {
                inner.state = BreakerState::Open { since: now };
                false
            }
        }
    }

    /// Get current circuit breaker state
    ///
    /// This is a plain read: it never performs the `open -> half_open`
    /// transition, only [`CircuitBreaker::can_execute`] does.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state.public()
    }

    /// Get current metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        CircuitBreakerMetrics {
            state: inner.state.public(),
            consecutive_failures: inner.consecutive_failures,
            total_successes: inner.total_successes,
            total_failures: inner.total_failures,
            rejected_calls: inner.rejected_calls,
        }
    }

    /// Time since the last recorded failure
    pub fn since_last_failure(&self) -> Option<std::time::Duration> {
        let last = self.inner.lock().last_failure?;
        Some(self.clock.now().saturating_duration_since(last))
    }

    /// Reset the circuit breaker
    pub fn reset(&self) {
        *self.inner.lock() = BreakerInner::new();
        debug!("Circuit breaker '{}' reset", self.name);
    }
}
