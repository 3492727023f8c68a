//! Validators for every configuration section

use super::trait_def::Validate;
use crate::config::models::*;

impl Validate for RateLimitSettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_requests == 0 {
            return Err("Rate limit max_requests must be greater than 0".to_string());
        }

        if self.window_secs == 0 {
            return Err("Rate limit window must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CircuitBreakerSettings {
    fn validate(&self) -> Result<(), String> {
        if self.failure_threshold == 0 {
            return Err("Circuit breaker failure_threshold must be greater than 0".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Circuit breaker timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RetrySettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Retry max_attempts must be at least 1".to_string());
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err(format!(
                "Retry base delay ({}ms) exceeds max delay ({}ms)",
                self.base_delay_ms, self.max_delay_ms
            ));
        }

        Ok(())
    }
}

impl Validate for LockSettings {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("Lock timeout must be greater than 0".to_string());
        }

        if let Some(dir) = &self.dir {
            if dir.as_os_str().is_empty() {
                return Err("Lock directory must not be empty".to_string());
            }
        }

        Ok(())
    }
}

impl Validate for CacheSettings {
    fn validate(&self) -> Result<(), String> {
        if self.ttl_secs == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        if self.sweep_interval_secs == 0 {
            return Err("Cache sweep interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CatalogSettings {
    fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid catalog base_url {:?}: {}", self.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Catalog base_url must use http or https, got {}",
                url.scheme()
            ));
        }

        if self.timeout_secs == 0 {
            return Err("Catalog timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingSettings {
    fn validate(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level {:?}: {}", self.level, e))
    }
}

impl Validate for CuratorConfig {
    fn validate(&self) -> Result<(), String> {
        self.rate_limit.validate()?;
        self.circuit_breaker.validate()?;
        self.retry.validate()?;
        self.lock.validate()?;
        self.cache.validate()?;
        self.catalog.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
