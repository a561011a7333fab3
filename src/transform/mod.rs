//! Optional record-format conversion.
//!
//! A [`Transformer`] wraps an optional [`Converter`]. Without one it is the
//! identity; with one it replaces the record bytes with the converter output,
//! keeping the original bytes (and logging a warning) when conversion fails.

mod external;

pub use external::ExternalConverter;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors produced by a converter.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Scratch file handling failed.
    #[error("converter I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The converter process could not be started.
    #[error("failed to start converter '{program}': {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The converter exited unsuccessfully.
    #[error("converter '{program}' exited with {status}")]
    Failed {
        /// Program that was invoked.
        program: String,
        /// Exit status description.
        status: String,
    },
}

/// Turns raw record bytes into converted record bytes.
///
/// Uses `async_trait` so converters can be held as `Box<dyn Converter>`.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Converts one record.
    async fn convert(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Applies the configured converter, if any, to each record.
#[derive(Default)]
pub struct Transformer {
    converter: Option<Box<dyn Converter>>,
}

impl Transformer {
    /// A pass-through transformer.
    #[must_use]
    pub fn disabled() -> Self {
        Self { converter: None }
    }

    /// A transformer backed by `converter`.
    #[must_use]
    pub fn with_converter(converter: Box<dyn Converter>) -> Self {
        Self {
            converter: Some(converter),
        }
    }

    /// Returns true if a converter is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.converter.is_some()
    }

    /// Converts `record`, falling back to the original bytes on failure.
    pub async fn apply(&self, record: Vec<u8>, identifier: &str) -> Vec<u8> {
        let Some(converter) = self.converter.as_deref() else {
            return record;
        };

        match converter.convert(&record).await {
            Ok(converted) => {
                debug!(identifier, converter = converter.name(), "record converted");
                converted
            }
            Err(error) => {
                warn!(
                    identifier,
                    converter = converter.name(),
                    error = %error,
                    "Json convert phase failed, keeping original record"
                );
                record
            }
        }
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("converter", &self.converter.as_deref().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl Converter for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn convert(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
            Ok(input.to_ascii_uppercase())
        }
    }

    struct Broken;

    #[async_trait]
    impl Converter for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn convert(&self, _input: &[u8]) -> Result<Vec<u8>, TransformError> {
            Err(TransformError::Failed {
                program: "broken".to_string(),
                status: "exit status: 1".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_disabled_transformer_is_identity() {
        let transformer = Transformer::disabled();
        assert!(!transformer.is_enabled());
        assert_eq!(transformer.apply(b"{}".to_vec(), "id").await, b"{}");
    }

    #[tokio::test]
    async fn test_converter_output_replaces_record() {
        let transformer = Transformer::with_converter(Box::new(Upper));
        assert_eq!(transformer.apply(b"abc".to_vec(), "id").await, b"ABC");
    }

    #[tokio::test]
    async fn test_converter_failure_keeps_original_bytes() {
        let transformer = Transformer::with_converter(Box::new(Broken));
        assert_eq!(
            transformer.apply(br#"{"a":1}"#.to_vec(), "id").await,
            br#"{"a":1}"#
        );
    }
}
