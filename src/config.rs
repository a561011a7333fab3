//! JSON run configuration.
//!
//! ```json
//! {
//!   "connection": {
//!     "url": "https://catalog.example.org/api/v1/",
//!     "db": "books",
//!     "query": "title all \"rust\"",
//!     "fcq": "",
//!     "downloadBatchSize": 50,
//!     "downloadListMaxsize": 1000
//!   },
//!   "output": {
//!     "elasticsearch": { "enable": false, "host": "http://localhost:9200", "index": "records" },
//!     "fileSystem": { "enable": true, "jsonDir": "json" },
//!     "csv": { "enable": true, "file": "links.csv" },
//!     "convertEnable": false
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::transport::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use crate::transport::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`HarvestConfig`].
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range or missing.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted field name.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestConfig {
    /// Remote catalog settings.
    pub connection: ConnectionConfig,
    /// Transport retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Destination settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote catalog settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Base URL; `db` is appended verbatim.
    pub url: String,
    /// Database path segment.
    #[serde(default)]
    pub db: String,
    /// Free-text query.
    pub query: String,
    /// Optional filter query; omitted from requests when empty.
    #[serde(default)]
    pub fcq: String,
    /// Page size (`maximumRecords`).
    #[serde(default = "default_batch_size")]
    pub download_batch_size: u32,
    /// Overall cap on records harvested in one run.
    pub download_list_maxsize: u64,
    /// Per-request connect timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Per-request total timeout.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

/// Transport retry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Attempts including the first request.
    pub max_attempts: u32,
    /// First backoff delay.
    pub min_wait_secs: u64,
    /// Backoff ceiling.
    pub max_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_wait_secs: 10,
            max_wait_secs: 30,
        }
    }
}

impl RetryConfig {
    /// Builds the transport retry policy.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.min_wait_secs),
            Duration::from_secs(self.max_wait_secs),
            2.0,
        )
    }
}

/// Destination settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    /// Search index sink.
    pub elasticsearch: IndexConfig,
    /// JSON file sink.
    pub file_system: FileSystemConfig,
    /// CSV sink.
    pub csv: CsvConfig,
    /// Run the external converter on every record.
    pub convert_enable: bool,
    /// External converter command.
    pub converter: ConverterConfig,
}

/// Search index sink settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexConfig {
    /// Enable the sink.
    pub enable: bool,
    /// Index server base URL.
    pub host: String,
    /// Index name.
    pub index: String,
    /// Basic-auth user; empty disables auth.
    pub login: String,
    /// Basic-auth password.
    pub pwd: String,
}

/// JSON file sink settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSystemConfig {
    /// Enable the sink.
    pub enable: bool,
    /// Directory under `<output>/<db>/`.
    pub json_dir: String,
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            enable: false,
            json_dir: "json".to_string(),
        }
    }
}

/// CSV sink settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvConfig {
    /// Enable the sink.
    pub enable: bool,
    /// File name under the output directory.
    pub file: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            enable: true,
            file: "links.csv".to_string(),
        }
    }
}

/// External converter command.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// Program to execute.
    pub program: String,
    /// Arguments placed before the input and output paths.
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["./utils/json_converter3.py".to_string()],
        }
    }
}

fn default_batch_size() -> u32 {
    50
}

fn default_connect_timeout() -> u64 {
    CONNECT_TIMEOUT_SECS
}

fn default_read_timeout() -> u64 {
    READ_TIMEOUT_SECS
}

impl HarvestConfig {
    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let conn = &self.connection;
        if conn.url.trim().is_empty() {
            return Err(ConfigError::invalid("connection.url", "must not be empty"));
        }
        if conn.query.trim().is_empty() {
            return Err(ConfigError::invalid("connection.query", "must not be empty"));
        }
        if conn.download_batch_size == 0 {
            return Err(ConfigError::invalid(
                "connection.downloadBatchSize",
                "must be at least 1",
            ));
        }
        if conn.download_list_maxsize == 0 {
            return Err(ConfigError::invalid(
                "connection.downloadListMaxsize",
                "must be at least 1",
            ));
        }
        if conn.connect_timeout_secs == 0 || conn.read_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "connection.*TimeoutSecs",
                "timeouts must be at least 1 second",
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.maxAttempts", "must be at least 1"));
        }
        if self.retry.min_wait_secs > self.retry.max_wait_secs {
            return Err(ConfigError::invalid(
                "retry.minWaitSecs",
                format!(
                    "{} exceeds retry.maxWaitSecs {}",
                    self.retry.min_wait_secs, self.retry.max_wait_secs
                ),
            ));
        }

        let out = &self.output;
        if out.elasticsearch.enable {
            if out.elasticsearch.host.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "output.elasticsearch.host",
                    "required when the index sink is enabled",
                ));
            }
            if out.elasticsearch.index.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "output.elasticsearch.index",
                    "required when the index sink is enabled",
                ));
            }
        }
        if out.file_system.enable && out.file_system.json_dir.trim().is_empty() {
            return Err(ConfigError::invalid(
                "output.fileSystem.jsonDir",
                "required when the file sink is enabled",
            ));
        }
        if out.csv.enable && out.csv.file.trim().is_empty() {
            return Err(ConfigError::invalid(
                "output.csv.file",
                "required when the CSV sink is enabled",
            ));
        }
        if out.convert_enable && out.converter.program.trim().is_empty() {
            return Err(ConfigError::invalid(
                "output.converter.program",
                "required when conversion is enabled",
            ));
        }

        Ok(())
    }

    /// Per-request connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.connect_timeout_secs)
    }

    /// Per-request total timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.read_timeout_secs)
    }
}
