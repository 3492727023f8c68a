//! Catalog service configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Catalog service configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// API base URL
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// API key sent as the `api_key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for CatalogSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
