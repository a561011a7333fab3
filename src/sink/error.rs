//! Error types for sinks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while setting up or writing to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// File system error.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The record body is not a JSON document.
    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("failed to write CSV row to {path}: {source}")]
    Csv {
        /// The CSV file.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Network error talking to the index.
    #[error("index request to {url} failed: {source}")]
    IndexNetwork {
        /// Request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The index answered with a non-2xx status.
    #[error("IndexRequest ERROR: {url} returned HTTP {status}: {body}")]
    IndexStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// The sink could not be constructed from its configuration.
    #[error("invalid {sink} sink configuration: {reason}")]
    Setup {
        /// Sink name.
        sink: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl SinkError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Creates a setup error.
    pub fn setup(sink: &'static str, reason: impl Into<String>) -> Self {
        Self::Setup {
            sink,
            reason: reason.into(),
        }
    }
}
