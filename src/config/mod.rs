//! Configuration management for curator
//!
//! This module handles loading, validation, and management of all curator configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{CuratorError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for curator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Curator configuration
    pub curator: CuratorConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CuratorError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let curator: CuratorConfig = serde_yaml::from_str(content)
            .map_err(|e| CuratorError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { curator };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for `CURATOR_*` names
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.curator.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of an already loaded configuration
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.curator.apply_env(|name| std::env::var(name).ok())?;
        self.validate()?;
        Ok(self)
    }

    pub fn rate_limit(&self) -> &RateLimitSettings {
        &self.curator.rate_limit
    }

    pub fn circuit_breaker(&self) -> &CircuitBreakerSettings {
        &self.curator.circuit_breaker
    }

    pub fn retry(&self) -> &RetrySettings {
        &self.curator.retry
    }

    pub fn lock(&self) -> &LockSettings {
        &self.curator.lock
    }

    pub fn cache(&self) -> &CacheSettings {
        &self.curator.cache
    }

    pub fn catalog(&self) -> &CatalogSettings {
        &self.curator.catalog
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.curator.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        Validate::validate(&self.curator).map_err(CuratorError::Config)?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.curator)
            .map_err(|e| CuratorError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
rate_limit:
  max_requests: 20
  window_secs: 5

circuit_breaker:
  failure_threshold: 3

lock:
  dir: "/var/lib/curator/locks"
  timeout_secs: 120

catalog:
  base_url: "http://localhost:9000/3"
  api_key: "secret"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.rate_limit().max_requests, 20);
        assert_eq!(config.rate_limit().window(), Duration::from_secs(5));
        assert_eq!(config.circuit_breaker().failure_threshold, 3);
        // unset fields keep their defaults
        assert_eq!(config.circuit_breaker().timeout_secs, 60);
        assert_eq!(config.retry(), &RetrySettings::default());
        assert_eq!(
            config.lock().dir,
            Some(PathBuf::from("/var/lib/curator/locks"))
        );
        assert_eq!(config.lock().timeout(), Duration::from_secs(120));
        assert_eq!(config.catalog().api_key.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = Config::from_file("/definitely/not/here.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, CuratorError::Config(_)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_yaml("retry:\n  max_attempts: 0\n").unwrap_err();
        assert!(matches!(err, CuratorError::Config(msg) if msg.contains("max_attempts")));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit().max_requests, 40);
        assert_eq!(config.rate_limit().window_secs, 10);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CURATOR_RATE_LIMIT_MAX_REQUESTS", "5"),
            ("CURATOR_RETRY_BASE_DELAY_MS", " 100 "),
            ("CURATOR_LOCK_DIR", "memory"),
            ("CURATOR_CATALOG_API_KEY", "k"),
            ("CURATOR_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::from_env_with(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.rate_limit().max_requests, 5);
        assert_eq!(config.retry().base_delay_ms, 100);
        assert_eq!(config.lock().dir, None);
        assert_eq!(config.catalog().api_key.as_deref(), Some("k"));
        assert!(config.logging().json);
    }

    #[test]
    fn test_unparsable_env_override_is_config_error() {
        let err = Config::from_env_with(|name| {
            (name == "CURATOR_BREAKER_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(
            matches!(err, CuratorError::Config(msg) if msg.contains("CURATOR_BREAKER_TIMEOUT_SECS"))
        );
    }

    #[test]
    fn test_config_serialization_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_api_key_is_redacted_in_debug_output() {
        let config = Config::from_env_with(|name| {
            (name == "CURATOR_CATALOG_API_KEY").then(|| "super-secret".to_string())
        })
        .unwrap();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
