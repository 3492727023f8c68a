use super::types::HttpClientConfig;
use crate::utils::error::{CuratorError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Utility functions for HTTP client operations
pub struct ClientUtils;

impl ClientUtils {
    /// Creates an HTTP client with the specified configuration
    pub fn create_http_client(config: &HttpClientConfig) -> Result<Client> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                CuratorError::config(format!("Invalid header name '{}': {}", key, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                CuratorError::config(format!("Invalid header value for '{}': {}", key, e))
            })?;
            headers.insert(name, value);
        }

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(client)
    }

    /// Parses a `Retry-After` header given in seconds
    ///
    /// HTTP-date values are ignored; the backoff schedule covers them.
    pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
        headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// Maps a transport-level failure onto the crate error
    pub fn transport_error(err: reqwest::Error) -> CuratorError {
        if err.is_builder() {
            CuratorError::HttpClient(err)
        } else if err.is_decode() {
            CuratorError::parsing(err.to_string())
        } else {
            CuratorError::network(err.to_string())
        }
    }
}
