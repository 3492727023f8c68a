//! # curator-rs
//!
//! Resilience building blocks for batch jobs that talk to rate-limited
//! third-party APIs: a sliding-window rate limiter, a circuit breaker, retry
//! with exponential backoff, a resilient HTTP client combining the three,
//! cross-process exclusive locks, and an expiring in-memory cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use curator_rs::{CatalogClient, Config, EnrichmentJob, JobRunner, ExclusiveLock};
//! use curator_rs::services::SearchQuery;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let catalog = Arc::new(CatalogClient::from_config(&config)?);
//!     let job = EnrichmentJob::new(catalog);
//!     let runner = JobRunner::new(ExclusiveLock::in_memory());
//!     let cancel = CancellationToken::new();
//!
//!     let queries = vec!["Alien:1979".parse::<SearchQuery>()?];
//!     let outcome = runner
//!         .run("enrich", config.lock().timeout(), &cancel, || job.run(&cancel, &queries))
//!         .await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod services;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::cache_manager::{CacheConfig, ExpiringCache};
pub use core::lock::{ExclusiveLock, FileLockStore, LockStore, MemoryLockStore};
pub use services::{
    CatalogClient, EnrichmentJob, EnrichmentReport, JobOutcome, JobRunner, MetadataSource,
};
pub use utils::error::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, CuratorError, Result, RetryConfig,
    RetryExecutor,
};
pub use utils::net::{RateLimitConfig, RateLimiter, ResilientClient};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
