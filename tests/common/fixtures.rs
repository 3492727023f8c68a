//! Test fixtures and factories

use curator_rs::config::CuratorConfig;
use curator_rs::Config;
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::MockServer;

/// Configuration pointing the catalog at `server` with millisecond backoff
pub fn catalog_config(server: &MockServer, failure_threshold: u32, max_attempts: u32) -> Config {
    let mut curator = CuratorConfig::default();
    curator.catalog.base_url = format!("{}/3", server.uri());
    curator.catalog.api_key = Some("integration-key".to_string());
    curator.circuit_breaker.failure_threshold = failure_threshold;
    curator.retry.max_attempts = max_attempts;
    curator.retry.base_delay_ms = 1;
    curator.retry.max_delay_ms = 10;
    Config { curator }
}

/// A fresh directory for lock files, removed when the guard drops
pub fn lock_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let locks = dir.path().join("locks");
    (dir, locks)
}

pub fn movie(id: u64, title: &str, release_date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "release_date": release_date,
        "overview": format!("{} overview", title),
    })
}

pub fn search_body(results: Vec<Value>) -> Value {
    json!({ "page": 1, "results": results, "total_results": 1 })
}
