//! System utilities
//!
//! This module provides the injectable time sources shared by the resilience components.

pub mod clock;

pub use clock::{Clock, MockClock, SharedClock, SystemClock, system_clock};
