//! Resilient HTTP client
//!
//! Composes the circuit breaker, the rate limiter and the retry executor
//! around one outbound operation.

use super::utils::ClientUtils;
use crate::utils::error::{CircuitBreaker, CuratorError, Result, RetryExecutor, Retryable};
use crate::utils::net::limiter::RateLimiter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How an attempt's outcome is reported to the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerVerdict {
    Success,
    Failure,
    Ignore,
}

fn verdict<T>(outcome: &Result<T>) -> BreakerVerdict {
    match outcome {
        Ok(_) => BreakerVerdict::Success,
        Err(err) if err.is_admission_denied() => BreakerVerdict::Ignore,
        Err(err) if err.is_retryable() => BreakerVerdict::Failure,
        Err(CuratorError::Parsing(_)) => BreakerVerdict::Failure,
        // The dependency answered coherently; the request was at fault
        Err(CuratorError::ClientError { .. }) => BreakerVerdict::Success,
        Err(_) => BreakerVerdict::Ignore,
    }
}

/// Client for one rate-limited, occasionally unreliable dependency
///
/// The breaker is consulted once per logical call. Every network round trip,
/// retries included, waits for a rate-limiter slot and reports its outcome
/// to the breaker. When a call's own failures open the circuit and a later
/// attempt of that call succeeds, the circuit closes again.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    name: String,
    http: Client,
    limiter: Arc<RateLimiter>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryExecutor,
}

impl ResilientClient {
    pub fn new(
        name: impl Into<String>,
        http: Client,
        limiter: Arc<RateLimiter>,
        breaker: Arc<CircuitBreaker>,
        retry: RetryExecutor,
    ) -> Self {
        Self {
            name: name.into(),
            http,
            limiter,
            breaker,
            retry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Run one logical call
    ///
    /// `operation` performs a single round trip and is invoked once per
    /// attempt. Returns `CuratorError::CircuitBreaker` without touching the
    /// dependency when the breaker refuses the call.
    pub async fn call<T, F, Fut>(&self, cancel: &CancellationToken, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.breaker.can_execute() {
            debug!("{}: circuit open, rejecting call", self.name);
            return Err(CuratorError::circuit_open(format!(
                "{} is unavailable",
                self.name
            )));
        }

        let opened = AtomicBool::new(false);
        let opened_here = &opened;
        self.retry
            .execute(cancel, || {
                let attempt = operation();
                async move {
                    self.limiter.wait(cancel).await?;
                    let outcome = attempt.await;
                    self.report(&outcome, opened_here);
                    outcome
                }
            })
            .await
    }

    /// GET `url` with `query` and decode the JSON body
    pub async fn get_json<T>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.call(cancel, || self.fetch_json(url, query)).await
    }

    async fn fetch_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ClientUtils::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = ClientUtils::parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(
                CuratorError::from_status(status.as_u16(), &body, retry_after).unwrap_or_else(
                    || CuratorError::parsing(format!("unexpected status {}", status)),
                ),
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(ClientUtils::transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CuratorError::parsing(format!("{}: undecodable response body: {}", self.name, e))
        })
    }

    fn report<T>(&self, outcome: &Result<T>, opened_here: &AtomicBool) {
        match verdict(outcome) {
            BreakerVerdict::Success => {
                if opened_here.load(Ordering::Acquire) {
                    self.breaker.record_recovery();
                } else {
                    self.breaker.record_success();
                }
            }
            BreakerVerdict::Failure => {
                if let Err(err) = outcome {
                    warn!("{}: call failed: {}", self.name, err);
                }
                if self.breaker.record_failure() {
                    opened_here.store(true, Ordering::Release);
                }
            }
            BreakerVerdict::Ignore => {}
        }
    }
}
