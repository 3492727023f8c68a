//! Common test utilities for curator-rs

pub mod fixtures;

pub use fixtures::{catalog_config, lock_dir, movie, search_body};
