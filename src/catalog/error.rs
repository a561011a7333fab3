//! Error types for the catalog module.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors raised while requesting or decoding a listing page.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The listing URL could not be built from the configured base URL.
    #[error("invalid listing URL '{url}': {source}")]
    InvalidListingUrl {
        /// The URL string that failed to parse.
        url: String,
        /// The parse error.
        #[source]
        source: url::ParseError,
    },

    /// The listing request failed after transport retries.
    #[error("listing request failed: {0}")]
    Fetch(#[source] TransportError),

    /// The listing body was not a valid listing document.
    #[error("failed to decode listing page from {url}: {source}")]
    Decode {
        /// The listing URL whose body failed to decode.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}
