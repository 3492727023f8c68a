//! Integration tests for curator-rs
//!
//! These tests wire real components together; only the catalog is mocked.

pub mod enrichment_tests;
pub mod job_runner_tests;
pub mod lock_tests;
