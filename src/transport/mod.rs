//! Retrying HTTP transport for catalog requests.
//!
//! This module provides the [`HttpClient`] used for every listing and record
//! request. Connection-level failures are retried with bounded exponential
//! backoff; responses outside the accepted status set (200, 207) are returned
//! to the caller as [`TransportError::HttpStatus`] without retrying.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::transport::{HttpClient, RetryPolicy};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(RetryPolicy::default())?;
//! let url = Url::parse("https://catalog.example.org/sru/books")?;
//! let body = client.get_json(&url).await?;
//! println!("received {} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod retry;

pub use client::{ACCEPTED_STATUSES, HttpClient};
pub use error::TransportError;
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, TransportError>` explicitly in function signatures.
