//! Listing response model.

use serde::Deserialize;

use super::Identifier;

/// Wire shape of one listing response.
///
/// ```json
/// { "records": { "record": [ { "recordIdentifier": "..." } ] },
///   "numberOfRecords": 120, "nextRecordPosition": 51 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    /// Record container; absent or `null` when the page is empty.
    #[serde(default)]
    pub records: Option<RecordList>,
    /// Server-declared total matching the query.
    pub number_of_records: u64,
    /// Server hint for the next `startRecord`.
    #[serde(default)]
    pub next_record_position: Option<u64>,
}

/// The `records` object of a listing response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordList {
    /// Entries in listing order.
    #[serde(default)]
    pub record: Vec<RecordEntry>,
}

/// One entry of the `record` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    /// Identifier of the full record.
    pub record_identifier: String,
}

/// One decoded page of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Server-declared total at the time of this page.
    pub reported_total: u64,
    /// Server hint for the next cursor; informational only.
    pub next_cursor: Option<u64>,
    /// Identifiers in the order the server returned them.
    pub records: Vec<Identifier>,
}

impl Page {
    /// Number of identifiers on the page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the page carries no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<ListingResponse> for Page {
    fn from(response: ListingResponse) -> Self {
        let records = response
            .records
            .map(|list| list.record)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| Identifier::new(entry.record_identifier))
            .collect();
        Self {
            reported_total: response.number_of_records,
            next_cursor: response.next_record_position,
            records,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_decodes_identifiers_in_order() {
        let body = r#"{
            "records": {"record": [{"recordIdentifier": "a"}, {"recordIdentifier": "b\\c"}]},
            "numberOfRecords": 10,
            "nextRecordPosition": 3
        }"#;
        let page: Page = serde_json::from_str::<ListingResponse>(body).unwrap().into();
        assert_eq!(page.reported_total, 10);
        assert_eq!(page.next_cursor, Some(3));
        assert_eq!(
            page.records,
            vec![Identifier::new("a"), Identifier::new("b\\c")]
        );
    }

    #[test]
    fn test_listing_without_records_is_empty_page() {
        let page: Page = serde_json::from_str::<ListingResponse>(r#"{"numberOfRecords": 0}"#)
            .unwrap()
            .into();
        assert!(page.is_empty());
        assert_eq!(page.next_cursor, None);

        let page: Page =
            serde_json::from_str::<ListingResponse>(r#"{"records": null, "numberOfRecords": 4}"#)
                .unwrap()
                .into();
        assert!(page.is_empty());
        assert_eq!(page.reported_total, 4);
    }

    #[test]
    fn test_listing_without_total_fails_to_decode() {
        let result = serde_json::from_str::<ListingResponse>(r#"{"records": {"record": []}}"#);
        assert!(result.is_err());
    }
}
