//! Converter that hands records to an external program via scratch files.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{Converter, TransformError};

const INPUT_FILE: &str = "input.json";
const OUTPUT_FILE: &str = "output.json";

/// Runs `<program> <args...> <input path> <output path>` once per record.
///
/// Each call gets its own temporary directory, removed when the call returns.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    args: Vec<String>,
}

impl ExternalConverter {
    /// Creates a converter invoking `program` with leading `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<(), TransformError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .arg(output)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| TransformError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(TransformError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

#[async_trait]
impl Converter for ExternalConverter {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self, input), fields(program = %self.program, bytes = input.len()))]
    async fn convert(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let scratch = tempfile::tempdir()?;
        let input_path = scratch.path().join(INPUT_FILE);
        let output_path = scratch.path().join(OUTPUT_FILE);

        tokio::fs::write(&input_path, input).await?;
        self.run(&input_path, &output_path).await?;
        let converted = tokio::fs::read(&output_path).await?;

        debug!(converted_bytes = converted.len(), "converter finished");
        Ok(converted)
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copying_converter_round_trips_bytes() {
        let converter = ExternalConverter::new("cp", Vec::new());
        let out = converter.convert(br#"{"title":"x"}"#).await.unwrap();
        assert_eq!(out, br#"{"title":"x"}"#);
    }

    #[tokio::test]
    async fn test_converter_output_file_becomes_record() {
        // $1 = input, $2 = output
        let converter = ExternalConverter::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"printf '{"converted":true}' > "$2""#.to_string(),
                "sh".to_string(),
            ],
        );
        let out = converter.convert(b"{}").await.unwrap();
        assert_eq!(out, br#"{"converted":true}"#);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let converter = ExternalConverter::new("false", Vec::new());
        let result = converter.convert(b"{}").await;
        assert!(
            matches!(result, Err(TransformError::Failed { .. })),
            "got: {result:?}"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let converter = ExternalConverter::new("definitely-not-a-converter-binary", Vec::new());
        let result = converter.convert(b"{}").await;
        assert!(
            matches!(result, Err(TransformError::Spawn { .. })),
            "got: {result:?}"
        );
    }
}
