//! Top-level curator configuration

use super::*;
use crate::utils::error::{CuratorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Every configuration section, as read from YAML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratorConfig {
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub lock: LockSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CuratorConfig {
    /// Apply `CURATOR_*` overrides obtained through `lookup`
    ///
    /// Taking the lookup as a function keeps tests away from the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvOverrides { lookup: &lookup };

        env.parse("CURATOR_RATE_LIMIT_MAX_REQUESTS", &mut self.rate_limit.max_requests)?;
        env.parse("CURATOR_RATE_LIMIT_WINDOW_SECS", &mut self.rate_limit.window_secs)?;

        env.parse(
            "CURATOR_BREAKER_FAILURE_THRESHOLD",
            &mut self.circuit_breaker.failure_threshold,
        )?;
        env.parse("CURATOR_BREAKER_TIMEOUT_SECS", &mut self.circuit_breaker.timeout_secs)?;

        env.parse("CURATOR_RETRY_MAX_ATTEMPTS", &mut self.retry.max_attempts)?;
        env.parse("CURATOR_RETRY_BASE_DELAY_MS", &mut self.retry.base_delay_ms)?;
        env.parse("CURATOR_RETRY_MAX_DELAY_MS", &mut self.retry.max_delay_ms)?;

        if let Some(dir) = env.get("CURATOR_LOCK_DIR") {
            self.lock.dir = match dir.as_str() {
                "" | "memory" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        env.parse("CURATOR_LOCK_TIMEOUT_SECS", &mut self.lock.timeout_secs)?;

        env.parse("CURATOR_CACHE_TTL_SECS", &mut self.cache.ttl_secs)?;
        env.parse(
            "CURATOR_CACHE_SWEEP_INTERVAL_SECS",
            &mut self.cache.sweep_interval_secs,
        )?;

        if let Some(url) = env.get("CURATOR_CATALOG_BASE_URL") {
            self.catalog.base_url = url;
        }
        if let Some(key) = env.get("CURATOR_CATALOG_API_KEY") {
            self.catalog.api_key = Some(key).filter(|k| !k.is_empty());
        }
        env.parse("CURATOR_CATALOG_TIMEOUT_SECS", &mut self.catalog.timeout_secs)?;

        if let Some(level) = env.get("CURATOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        env.parse("CURATOR_LOG_JSON", &mut self.logging.json)?;

        Ok(())
    }
}

struct EnvOverrides<'a, F> {
    lookup: &'a F,
}

impl<F> EnvOverrides<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).map(|value| value.trim().to_string())
    }

    fn parse<T>(&self, name: &str, target: &mut T) -> Result<()>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(raw) = self.get(name) {
            *target = raw
                .parse()
                .map_err(|e| CuratorError::config(format!("Invalid {}={:?}: {}", name, raw, e)))?;
        }
        Ok(())
    }
}
