//! Harvester Core Library
//!
//! This library harvests bibliographic records from a paginated
//! search/retrieve catalog API and distributes every record to the
//! configured destinations: a search index, a JSON file store and a CSV
//! export of document links.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`transport`] - Retrying HTTP client and failure classification
//! - [`catalog`] - Listing pagination, run state and per-record fetching
//! - [`transform`] - Optional external record-format conversion
//! - [`sink`] - Index, file and CSV destinations plus the dispatcher
//! - [`harvest`] - Orchestrator owning the fatal-vs-skip policy
//! - [`config`] - JSON run configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod harvest;
pub mod sink;
pub mod transform;
pub mod transport;

mod user_agent;

// Re-export commonly used types
pub use catalog::{
    Identifier, ListingResponse, Page, Paginator, RecordFetcher, RunState, format_identifier,
};
pub use config::{ConfigError, HarvestConfig};
pub use harvest::{HarvestError, HarvestStats, Harvester, Severity};
pub use sink::{
    DispatchOutcome, FileSink, IndexSink, Record, Sink, SinkDispatcher, SinkError, TabularSink,
    extract_href,
};
pub use transform::{Converter, ExternalConverter, TransformError, Transformer};
pub use transport::{
    DEFAULT_MAX_ATTEMPTS, FailureType, HttpClient, RetryDecision, RetryPolicy, TransportError,
    classify_error,
};
