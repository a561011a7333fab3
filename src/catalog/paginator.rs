//! Cursor-driven paging over the listing endpoint.

use tracing::{debug, info, instrument};
use url::Url;

use super::error::CatalogError;
use super::listing::{ListingResponse, Page};
use super::state::RunState;
use crate::transport::HttpClient;

/// Drives the listing endpoint one page at a time.
///
/// The paginator itself is stateless between calls; the cursor and target
/// total live in the caller's [`RunState`], which [`next_page`](Self::next_page)
/// tightens as pages arrive.
#[derive(Debug, Clone)]
pub struct Paginator {
    client: HttpClient,
    listing_url: Url,
    query: String,
    fcq: String,
    page_size: u32,
}

impl Paginator {
    /// Creates a paginator for `base_url` + `db`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidListingUrl`] if the concatenated URL does not parse.
    pub fn new(
        client: HttpClient,
        base_url: &str,
        db: &str,
        query: impl Into<String>,
        fcq: impl Into<String>,
        page_size: u32,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            client,
            listing_url: listing_url(base_url, db)?,
            query: query.into(),
            fcq: fcq.into(),
            page_size,
        })
    }

    /// The listing endpoint without query parameters.
    #[must_use]
    pub fn listing_url(&self) -> &Url {
        &self.listing_url
    }

    /// Fixed page size sent as `maximumRecords`.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Builds the listing request URL for a 1-based `start_record`.
    ///
    /// `fcq` is omitted entirely when empty.
    #[must_use]
    pub fn page_url(&self, start_record: u64) -> Url {
        let mut url = self.listing_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &self.query);
            if !self.fcq.is_empty() {
                pairs.append_pair("fcq", &self.fcq);
            }
            pairs.append_pair("maximumRecords", &self.page_size.to_string());
            pairs.append_pair("startRecord", &start_record.to_string());
        }
        url
    }

    /// Requests the next page, or returns `None` once `state` is done.
    ///
    /// On success the state's target total is clamped to the page's reported total.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] if the request fails and
    /// [`CatalogError::Decode`] if the body is not a listing document.
    #[instrument(skip(self, state), fields(cursor = state.cursor(), target_total = state.target_total()))]
    pub async fn next_page(&self, state: &mut RunState) -> Result<Option<Page>, CatalogError> {
        if state.is_done() {
            debug!("cursor reached target total, no more pages");
            return Ok(None);
        }

        let url = self.page_url(state.start_record());
        let body = self
            .client
            .get_json(&url)
            .await
            .map_err(CatalogError::Fetch)?;

        let response: ListingResponse =
            serde_json::from_slice(&body).map_err(|e| CatalogError::decode(url.as_str(), e))?;
        let page = Page::from(response);

        state.observe_total(page.reported_total);

        info!(
            "Start to download [{}-{}]/{}",
            state.start_record(),
            state.cursor() + page.len() as u64,
            state.target_total()
        );

        Ok(Some(page))
    }
}

/// Joins base URL and database segment the way the catalog expects (plain concatenation).
fn listing_url(base_url: &str, db: &str) -> Result<Url, CatalogError> {
    let joined = format!("{base_url}{db}");
    Url::parse(&joined).map_err(|source| CatalogError::InvalidListingUrl {
        url: joined,
        source,
    })
}
