//! JSON file sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, instrument, warn};

use super::{Record, Sink, SinkError};

/// Indentation used for stored records.
const INDENT: &[u8] = b"    ";

/// Writes each record to `<dir>/<formatted id>.json`.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Creates the sink, creating `<output_dir>/<db>/<json_dir>` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory cannot be created.
    pub fn create(output_dir: &Path, db: &str, json_dir: &str) -> Result<Self, SinkError> {
        let dir = output_dir.join(db).join(json_dir);
        std::fs::create_dir_all(&dir).map_err(|e| SinkError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Directory receiving the JSON files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a formatted record id.
    #[must_use]
    pub fn path_for(&self, formatted_id: &str) -> PathBuf {
        self.dir.join(format!("{formatted_id}.json"))
    }
}

/// Re-indents a JSON document with four spaces, keeping key order.
///
/// # Errors
///
/// Returns [`SinkError::Json`] if `body` is not JSON.
pub fn pretty_json(body: &[u8]) -> Result<Vec<u8>, SinkError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let mut out = Vec::with_capacity(body.len() * 2);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(out)
}

#[async_trait]
impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self, record), fields(id = %record.formatted_id))]
    async fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        let pretty = pretty_json(&record.body)?;
        let path = self.path_for(&record.formatted_id);

        if let Err(e) = tokio::fs::write(&path, &pretty).await {
            // Never leave a half-written record behind.
            if let Err(remove_err) = tokio::fs::remove_file(&path).await
                && remove_err.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %path.display(), error = %remove_err, "failed to remove partial file");
            }
            return Err(SinkError::io(path, e));
        }

        info!("Json file \"{}\" saved", path.display());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Identifier;
    use tempfile::TempDir;

    #[test]
    fn test_pretty_json_uses_four_spaces_and_keeps_order() {
        let pretty = pretty_json(br#"{"z":1,"a":{"b":[1,2]}}"#).unwrap();
        let text = String::from_utf8(pretty).unwrap();
        assert_eq!(
            text,
            "{\n    \"z\": 1,\n    \"a\": {\n        \"b\": [\n            1,\n            2\n        ]\n    }\n}"
        );
    }

    #[test]
    fn test_pretty_json_rejects_garbage() {
        assert!(matches!(pretty_json(b"not json"), Err(SinkError::Json(_))));
    }

    #[test]
    fn test_create_builds_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::create(temp.path(), "books", "json").unwrap();
        assert!(sink.dir().is_dir());
        assert_eq!(sink.dir(), temp.path().join("books").join("json"));
    }

    #[tokio::test]
    async fn test_write_uses_formatted_id() {
        let temp = TempDir::new().unwrap();
        let mut sink = FileSink::create(temp.path(), "db", "json").unwrap();
        let record = Record::new(Identifier::new("A\\B"), br#"{"k":"v"}"#.to_vec());

        sink.write(&record).await.unwrap();

        let path = temp.path().join("db").join("json").join("A_B.json");
        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(stored, serde_json::json!({"k": "v"}));
    }

    #[tokio::test]
    async fn test_invalid_json_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let mut sink = FileSink::create(temp.path(), "db", "json").unwrap();
        let record = Record::new(Identifier::new("bad"), b"<xml/>".to_vec());

        assert!(sink.write(&record).await.is_err());
        assert!(!sink.path_for("bad").exists());
    }
}
