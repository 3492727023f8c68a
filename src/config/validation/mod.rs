//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.

mod trait_def;
mod validators;

pub use trait_def::Validate;
