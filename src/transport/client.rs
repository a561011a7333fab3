//! HTTP client wrapper with retry for catalog GET requests.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::TransportError;
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::user_agent;

/// Status codes treated as a successful application response.
pub const ACCEPTED_STATUSES: [u16; 2] = [200, 207];

/// HTTP client for catalog requests.
///
/// Created once per run and reused for every listing and record request so the
/// underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry_policy: RetryPolicy,
}

impl HttpClient {
    /// Creates a client with default timeouts (30s connect, 5min read).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if the underlying client cannot be built.
    pub fn new(retry_policy: RetryPolicy) -> Result<Self, TransportError> {
        Self::with_timeouts(
            retry_policy,
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(READ_TIMEOUT_SECS),
        )
    }

    /// Creates a client with explicit per-call timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if the underlying client cannot be built.
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn with_timeouts(
        retry_policy: RetryPolicy,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| TransportError::Build { source })?;

        Ok(Self {
            client,
            retry_policy,
        })
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Issues a GET for `url` and returns the full response body.
    ///
    /// Transient transport failures are retried according to the retry policy.
    /// A response whose status is not in [`ACCEPTED_STATUSES`] is returned
    /// immediately as [`TransportError::HttpStatus`].
    ///
    /// # Errors
    ///
    /// Returns the last [`TransportError`] once retries are exhausted, or the
    /// first non-retryable one.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "sending request");

            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    let failure_type = classify_error(&e);
                    match self.retry_policy.should_retry(failure_type, attempt) {
                        RetryDecision::Retry {
                            delay,
                            attempt: next_attempt,
                        } => {
                            info!(
                                url = %url,
                                attempt = next_attempt,
                                max_attempts = self.retry_policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                error = %e,
                                "retrying request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(url = %url, %reason, attempts = attempt, "not retrying request");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Single request attempt; always drains the body.
    async fn get_once(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url.as_str())
            } else {
                TransportError::network(url.as_str(), e)
            }
        })?;

        let status = response.status().as_u16();
        if !ACCEPTED_STATUSES.contains(&status) {
            // Drain so the connection can return to the pool.
            let _ = response.bytes().await;
            return Err(TransportError::http_status(url.as_str(), status));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url.as_str())
            } else {
                TransportError::body(url.as_str(), e)
            }
        })?;
        Ok(body.to_vec())
    }
}
