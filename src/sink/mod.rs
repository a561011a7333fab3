//! Record destinations.
//!
//! Every destination implements [`Sink`]. The [`SinkDispatcher`] holds the
//! enabled sinks in a fixed order (index, file, tabular) and offers each
//! record to all of them, isolating one sink's failure from the others.
//!
//! - [`IndexSink`] - upserts the record into a search index with refresh-on-write
//! - [`FileSink`] - writes `<formatted id>.json`, indented with four spaces
//! - [`TabularSink`] - appends `id,pdfLink` rows to a shared CSV file

mod dispatcher;
mod error;
mod file;
mod index;
mod tabular;

pub use dispatcher::{DispatchOutcome, SinkDispatcher};
pub use error::SinkError;
pub use file::FileSink;
pub use index::IndexSink;
pub use tabular::{HREF_FIELD, TabularSink, extract_href};

use async_trait::async_trait;

use crate::catalog::Identifier;

/// One fetched (and possibly converted) record on its way to the sinks.
#[derive(Debug, Clone)]
pub struct Record {
    /// Identifier as reported by the listing.
    pub identifier: Identifier,
    /// Filesystem-safe identifier, used as file name and document id.
    pub formatted_id: String,
    /// Raw record document.
    pub body: Vec<u8>,
}

impl Record {
    /// Builds a record, deriving the formatted id from `identifier`.
    #[must_use]
    pub fn new(identifier: Identifier, body: Vec<u8>) -> Self {
        let formatted_id = identifier.formatted();
        Self {
            identifier,
            formatted_id,
            body,
        }
    }
}

/// A destination for harvested records.
///
/// Uses `async_trait` so sinks can be collected as `Vec<Box<dyn Sink>>`.
#[async_trait]
pub trait Sink: Send {
    /// Short name for logs ("index", "file", "csv").
    fn name(&self) -> &str;

    /// Writes one record.
    async fn write(&mut self, record: &Record) -> Result<(), SinkError>;

    /// Flushes any buffered state at the end of the run.
    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
