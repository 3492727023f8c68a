//! Error handling for curator
//!
//! This module defines the error type shared by every component of the crate.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod types;

pub use types::{CuratorError, Result};
