//! Per-record retrieval.

use tracing::{debug, instrument};
use url::Url;

use super::Identifier;
use crate::transport::{HttpClient, TransportError};

/// Value of the `recordSchema` parameter sent with every record request.
pub const RECORD_SCHEMA: &str = "gost-7.0.100";

/// Fetches full record bodies from `<listing url>/<escaped identifier>`.
#[derive(Debug, Clone)]
pub struct RecordFetcher {
    client: HttpClient,
    listing_url: Url,
}

impl RecordFetcher {
    /// Creates a fetcher rooted at the listing endpoint.
    #[must_use]
    pub fn new(client: HttpClient, listing_url: Url) -> Self {
        Self {
            client,
            listing_url,
        }
    }

    /// Builds the record URL for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::DotSegment`] for `.` and `..`, which cannot
    /// be addressed below the listing path, and [`TransportError::InvalidUrl`]
    /// if the result does not parse.
    pub fn record_url(&self, identifier: &Identifier) -> Result<Url, TransportError> {
        let base = self.listing_url.as_str().trim_end_matches('/');
        if identifier.is_dot_segment() {
            return Err(TransportError::dot_segment(base, identifier.as_str()));
        }
        let raw = format!("{base}/{}", identifier.path_escaped());
        let mut url = Url::parse(&raw).map_err(|_| TransportError::invalid_url(raw.clone()))?;
        url.query_pairs_mut()
            .append_pair("recordSchema", RECORD_SCHEMA);
        Ok(url)
    }

    /// Downloads the record body for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns the transport error once retries are exhausted or the server
    /// answers with a non-accepted status.
    #[instrument(skip(self), fields(identifier = %identifier))]
    pub async fn fetch(&self, identifier: &Identifier) -> Result<Vec<u8>, TransportError> {
        let url = self.record_url(identifier)?;
        let body = self.client.get_json(&url).await?;
        debug!(bytes = body.len(), "record fetched");
        Ok(body)
    }
}
