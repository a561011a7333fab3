//! Catalog access: listing pagination and per-record retrieval.
//!
//! - [`Paginator`] walks the listing endpoint with a moving `startRecord`
//!   cursor and a fixed page size
//! - [`RunState`] holds the cursor and the shrinking target total
//! - [`RecordFetcher`] downloads one record body per identifier
//! - [`Identifier`] wraps a remote record identifier with its URL and
//!   filesystem-safe renderings

mod error;
mod fetcher;
mod identifier;
mod listing;
mod paginator;
mod state;

pub use error::CatalogError;
pub use fetcher::{RECORD_SCHEMA, RecordFetcher};
pub use identifier::{Identifier, format_identifier};
pub use listing::{ListingResponse, Page};
pub use paginator::Paginator;
pub use state::RunState;
