//! CSV sink: one `id,href` row per record.

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{Record, Sink, SinkError};

/// Record field holding the document link.
pub const HREF_FIELD: &str = "pdfLink";

/// Appends rows to a single CSV file opened once for the run.
pub struct TabularSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl std::fmt::Debug for TabularSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl TabularSink {
    /// Creates (truncating) the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::io(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| SinkError::io(&path, e))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        Ok(Self { path, writer })
    }

    /// Path of the CSV file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Extracts the [`HREF_FIELD`] string from a record document.
///
/// Returns `None` when the record is not a JSON object or the field is
/// missing or not a string.
#[must_use]
pub fn extract_href(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .as_object()?
        .get(HREF_FIELD)?
        .as_str()
        .map(ToString::to_string)
}

#[async_trait]
impl Sink for TabularSink {
    fn name(&self) -> &str {
        "csv"
    }

    #[instrument(skip(self, record), fields(id = %record.formatted_id))]
    async fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        let href = extract_href(&record.body).unwrap_or_else(|| {
            warn!(field = HREF_FIELD, "Failed to get href, writing empty value");
            String::new()
        });

        self.writer
            .write_record([record.formatted_id.as_str(), href.as_str()])
            .map_err(|e| SinkError::csv(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| SinkError::io(&self.path, e))?;

        debug!(href = %href, "csv row written");
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|e| SinkError::io(&self.path, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Identifier;
    use tempfile::TempDir;

    #[test]
    fn test_extract_href_present() {
        assert_eq!(
            extract_href(br#"{"pdfLink":"http://x/y.pdf"}"#),
            Some("http://x/y.pdf".to_string())
        );
    }

    #[test]
    fn test_extract_href_missing_or_wrong_type() {
        assert_eq!(extract_href(br#"{"title":"t"}"#), None);
        assert_eq!(extract_href(br#"{"pdfLink":42}"#), None);
        assert_eq!(extract_href(br#"["pdfLink"]"#), None);
        assert_eq!(extract_href(b"not json"), None);
    }

    #[tokio::test]
    async fn test_rows_are_flushed_after_each_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("links.csv");
        let mut sink = TabularSink::create(&path).unwrap();

        sink.write(&Record::new(
            Identifier::new("A\\B"),
            br#"{"pdfLink":"http://x/y.pdf"}"#.to_vec(),
        ))
        .await
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "A_B,http://x/y.pdf\n"
        );

        sink.write(&Record::new(Identifier::new("c"), br#"{}"#.to_vec()))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "A_B,http://x/y.pdf\nc,\n"
        );
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("out.csv");
        let sink = TabularSink::create(&path).unwrap();
        assert!(sink.path().exists());
    }
}
