//! Error handling utilities
//!
//! This module provides the crate error type together with the recovery
//! primitives (circuit breaker, retry) that classify and react to it.

pub mod error;
pub mod recovery;

// Re-export commonly used types
pub use error::*;
pub use recovery::*;
