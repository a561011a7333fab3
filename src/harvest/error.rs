//! Run-level errors and their severity.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::transport::TransportError;

/// Whether an error ends the run or only the current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run.
    Fatal,
    /// Log and continue with the next record.
    Recoverable,
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// Directory path.
        path: std::path::PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog HTTP client could not be built.
    #[error("failed to set up catalog client: {0}")]
    Client(#[source] TransportError),

    /// A sink could not be set up.
    #[error("failed to set up {sink} sink: {source}")]
    SinkSetup {
        /// Sink name.
        sink: &'static str,
        /// The underlying sink error.
        #[source]
        source: SinkError,
    },

    /// A listing page could not be fetched or decoded.
    #[error(transparent)]
    Listing(#[from] CatalogError),

    /// A single record could not be fetched.
    #[error("failed to fetch record {identifier}: {source}")]
    Record {
        /// Raw identifier.
        identifier: String,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl HarvestError {
    /// Creates a record fetch error.
    pub fn record(identifier: impl Into<String>, source: TransportError) -> Self {
        Self::Record {
            identifier: identifier.into(),
            source,
        }
    }

    /// Classifies the error for the abort-vs-skip decision.
    ///
    /// Record fetch failures are recoverable unless the request URL itself
    /// could not be built; everything else is fatal.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Record {
                source: TransportError::InvalidUrl { .. },
                ..
            } => Severity::Fatal,
            Self::Record { .. } => Severity::Recoverable,
            Self::Config(_)
            | Self::OutputDir { .. }
            | Self::Client(_)
            | Self::SinkSetup { .. }
            | Self::Listing(_) => Severity::Fatal,
        }
    }

    /// Shorthand for `severity() == Severity::Fatal`.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_failure_is_recoverable() {
        let error = HarvestError::record("id", TransportError::http_status("http://x/id", 404));
        assert_eq!(error.severity(), Severity::Recoverable);
        assert!(!error.is_fatal());
        assert!(error.to_string().contains("id"));
    }

    #[test]
    fn test_record_invalid_url_is_fatal() {
        let error = HarvestError::record("id", TransportError::invalid_url("::"));
        assert!(error.is_fatal());
    }

    #[test]
    fn test_record_dot_segment_is_recoverable() {
        let error = HarvestError::record("..", TransportError::dot_segment("http://x/db", ".."));
        assert_eq!(error.severity(), Severity::Recoverable);
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let error = HarvestError::Listing(CatalogError::Fetch(TransportError::http_status(
            "http://x/db",
            500,
        )));
        assert_eq!(error.severity(), Severity::Fatal);
    }

    #[test]
    fn test_sink_setup_failure_is_fatal() {
        let error = HarvestError::SinkSetup {
            sink: "csv",
            source: SinkError::setup("csv", "no file"),
        };
        assert!(error.is_fatal());
    }
}
