//! Retry logic with bounded exponential backoff for transport failures.
//!
//! When a request fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - connection/transport failures that may succeed on retry
//! - [`FailureType::Application`] - the server answered with a non-accepted status
//! - [`FailureType::Permanent`] - failures no retry can fix (bad URL, TLS setup)
//!
//! Only transient failures are retried here. Application failures go straight
//! back to the caller, which decides whether they abort the run or skip a record.
//!
//! # Example
//!
//! ```
//! use harvester_core::transport::{FailureType, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! match policy.should_retry(FailureType::Transient, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::TransportError;
use super::constants::{DEFAULT_MAX_WAIT, DEFAULT_MIN_WAIT, MAX_JITTER};

/// Default maximum attempts: the initial request plus five retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Classification of transport failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Connection or transport failure that may succeed on retry.
    ///
    /// Examples: connection refused, reset, timeout, truncated body.
    Transient,

    /// The server answered, but with a status outside {200, 207}.
    Application,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: invalid URL, TLS/certificate errors, client build failure.
    Permanent,
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the request.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with bounded exponential backoff.
///
/// # Default Values
///
/// - `max_attempts`: 6
/// - `min_wait`: 10 seconds
/// - `max_wait`: 30 seconds
/// - `backoff_multiplier`: 2.0
///
/// # Delay Calculation
///
/// ```text
/// delay = min(min_wait * multiplier^(attempt - 1) + jitter, max_wait)
/// ```
///
/// With defaults, delays are approximately: 10s, 20s, 30s, 30s, 30s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay before the first retry.
    min_wait: Duration,

    /// Upper bound for any delay.
    max_wait: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_wait: DEFAULT_MIN_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1 and `max_wait` to at least `min_wait`.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        min_wait: Duration,
        max_wait: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_wait,
            max_wait: max_wait.max(min_wait),
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the configured minimum wait.
    #[must_use]
    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    /// Returns the configured maximum wait.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed with `failure_type`.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Application => {
                return RetryDecision::DoNotRetry {
                    reason: "application failure - left to the caller".to_string(),
                };
            }
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::Transient => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the delay after a failed attempt, bounded by `[min_wait, max_wait]`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.min_wait.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        // attempt 1 = 1x min_wait
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_wait.as_millis() as f64);

        let delay = Duration::from_millis(capped_ms as u64) + self.calculate_jitter();
        delay.min(self.max_wait)
    }

    /// Generates random jitter between 0 and `MAX_JITTER`.
    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter(&self) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies a transport error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Network (most) | Transient |
/// | Network (TLS) | Permanent |
/// | Timeout | Transient |
/// | Body | Transient |
/// | HttpStatus | Application |
/// | InvalidUrl | Permanent |
/// | DotSegment | Permanent |
/// | Build | Permanent |
#[instrument]
pub fn classify_error(error: &TransportError) -> FailureType {
    match error {
        TransportError::Network { source, .. } => {
            if is_tls_error(source) {
                FailureType::Permanent
            } else {
                FailureType::Transient
            }
        }
        TransportError::Timeout { .. } | TransportError::Body { .. } => FailureType::Transient,
        TransportError::HttpStatus { .. } => FailureType::Application,
        TransportError::InvalidUrl { .. }
        | TransportError::DotSegment { .. }
        | TransportError::Build { .. } => FailureType::Permanent,
    }
}

/// Checks whether a reqwest error was caused by TLS setup or certificate validation.
///
/// Only the `source()` chain is inspected: the top-level message embeds the
/// request URL, whose query or identifier may contain any of the markers.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>()
            && is_connection_io_error(io.kind())
        {
            return false;
        }
        if has_tls_marker(&inner.to_string()) {
            return true;
        }
        source = inner.source();
    }
    false
}

fn has_tls_marker(message: &str) -> bool {
    let message = message.to_lowercase();
    TLS_MARKERS.iter().any(|marker| message.contains(marker))
}

const TLS_MARKERS: [&str; 4] = ["certificate", "tls", "ssl", "handshake"];

fn is_connection_io_error(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind;
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::TimedOut
    )
}
