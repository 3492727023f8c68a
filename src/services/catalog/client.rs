//! Catalog search client

use super::types::{CatalogItem, SearchQuery, SearchResponse};
use crate::config::Config;
use crate::core::cache_manager::{CacheConfig, ExpiringCache};
use crate::utils::error::{CircuitBreaker, Result, RetryExecutor};
use crate::utils::net::{ClientUtils, HttpClientConfig, RateLimiter, ResilientClient};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Anything that can look a movie up by title and year
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn search_movie(
        &self,
        cancel: &CancellationToken,
        query: &SearchQuery,
    ) -> Result<Vec<CatalogItem>>;
}

/// Catalog client: every search goes through the resilient client, answers
/// are cached per normalized `title|year`
pub struct CatalogClient {
    client: ResilientClient,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<ExpiringCache<String, Vec<CatalogItem>>>,
}

impl CatalogClient {
    pub fn new(
        client: ResilientClient,
        base_url: impl Into<String>,
        api_key: Option<String>,
        cache: Arc<ExpiringCache<String, Vec<CatalogItem>>>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            cache,
        }
    }

    /// Wire limiter, breaker, retry and cache from configuration
    ///
    /// The cache sweep is not started here; call `start_sweeper` on
    /// [`CatalogClient::cache`] from inside a runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = config.catalog();
        let http = ClientUtils::create_http_client(&HttpClientConfig {
            timeout: catalog.timeout(),
            ..Default::default()
        })?;

        let client = ResilientClient::new(
            "catalog",
            http,
            Arc::new(RateLimiter::from_config(config.rate_limit().into())),
            Arc::new(CircuitBreaker::new(
                "catalog",
                config.circuit_breaker().into(),
            )),
            RetryExecutor::new(config.retry().into()),
        );
        let cache = Arc::new(ExpiringCache::new(CacheConfig::from(config.cache())));

        Ok(Self::new(
            client,
            catalog.base_url.clone(),
            catalog.api_key.clone(),
            cache,
        ))
    }

    pub fn resilient(&self) -> &ResilientClient {
        &self.client
    }

    pub fn cache(&self) -> &Arc<ExpiringCache<String, Vec<CatalogItem>>> {
        &self.cache
    }

    /// Search the catalog for `title`, optionally narrowed to `year`
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<CatalogItem>> {
        self.search_movie(cancel, &SearchQuery::new(title, year))
            .await
    }

    fn query_params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", query.title.trim().to_string())];
        if let Some(year) = query.year {
            params.push(("year", year.to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("breaker", &self.client.breaker().state())
            .field("cache", &self.cache)
            .finish()
    }
}

#[async_trait]
impl MetadataSource for CatalogClient {
    async fn search_movie(
        &self,
        cancel: &CancellationToken,
        query: &SearchQuery,
    ) -> Result<Vec<CatalogItem>> {
        let key = query.cache_key();
        if let Some(items) = self.cache.get(&key) {
            debug!("Catalog cache hit for {}", query);
            return Ok(items);
        }

        let url = format!("{}/search/movie", self.base_url);
        let params = self.query_params(query);
        let response: SearchResponse = self.client.get_json(cancel, &url, &params).await?;

        debug!(
            "Catalog returned {} results for {}",
            response.results.len(),
            query
        );
        self.cache.insert(key, response.results.clone());
        Ok(response.results)
    }
}
