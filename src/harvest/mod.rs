//! Harvest orchestration.
//!
//! The [`Harvester`] wires paginator, record fetcher, transformer and sink
//! dispatcher together and owns the fatal-vs-skip policy:
//!
//! - `bootstrap` (Init): builds the client and every enabled sink; any failure is fatal
//! - `run` (Paging): fetches pages until the cursor reaches the target total;
//!   a page fetch or decode failure aborts the run
//! - per record: fetch, transform, dispatch; failures are logged and skipped
//!
//! Everything runs on one task, strictly in listing order.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use harvester_core::{HarvestConfig, Harvester};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::load(Path::new("config.json"))?;
//! let mut harvester = Harvester::bootstrap(&config, Path::new("output")).await?;
//! let stats = harvester.run().await?;
//! println!("fetched {} of {} records", stats.fetched, stats.attempted);
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::{HarvestError, Severity};

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::catalog::{Identifier, Paginator, RecordFetcher, RunState};
use crate::config::HarvestConfig;
use crate::sink::{DispatchOutcome, FileSink, IndexSink, Record, Sink, SinkDispatcher, TabularSink};
use crate::transform::{ExternalConverter, Transformer};
use crate::transport::HttpClient;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Listing pages received.
    pub pages: u64,
    /// Identifiers consumed (final cursor).
    pub attempted: u64,
    /// Records fetched successfully and dispatched.
    pub fetched: u64,
    /// Records skipped because their fetch failed.
    pub fetch_failures: u64,
    /// Individual sink writes that failed.
    pub sink_failures: u64,
    /// Effective target total at the end of the run.
    pub target_total: u64,
}

/// The harvest pipeline for one run.
#[derive(Debug)]
pub struct Harvester {
    paginator: Paginator,
    fetcher: RecordFetcher,
    transformer: Transformer,
    dispatcher: SinkDispatcher,
    max_downloads: u64,
}

impl Harvester {
    /// Builds the pipeline from configuration (the `Init` phase).
    ///
    /// Creates `output_dir`, the JSON directory and the CSV file for the
    /// enabled sinks, and constructs the index client.
    ///
    /// # Errors
    ///
    /// Every failure here is fatal: see [`HarvestError::severity`].
    #[instrument(skip(config), fields(output_dir = %output_dir.display()))]
    pub async fn bootstrap(config: &HarvestConfig, output_dir: &Path) -> Result<Self, HarvestError> {
        config.validate()?;

        std::fs::create_dir_all(output_dir).map_err(|source| HarvestError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let conn = &config.connection;
        let client = HttpClient::with_timeouts(
            config.retry.policy(),
            config.connect_timeout(),
            config.read_timeout(),
        )
        .map_err(HarvestError::Client)?;

        let paginator = Paginator::new(
            client.clone(),
            &conn.url,
            &conn.db,
            conn.query.clone(),
            conn.fcq.clone(),
            conn.download_batch_size,
        )?;
        let fetcher = RecordFetcher::new(client, paginator.listing_url().clone());

        let dispatcher = build_dispatcher(config, output_dir).await?;

        let out = &config.output;
        let transformer = if out.convert_enable {
            Transformer::with_converter(Box::new(ExternalConverter::new(
                out.converter.program.clone(),
                out.converter.args.clone(),
            )))
        } else {
            Transformer::disabled()
        };

        info!(
            listing_url = %paginator.listing_url(),
            sinks = ?dispatcher.names(),
            convert = transformer.is_enabled(),
            max_downloads = conn.download_list_maxsize,
            "harvester ready"
        );

        Ok(Self::with_parts(
            paginator,
            fetcher,
            transformer,
            dispatcher,
            conn.download_list_maxsize,
        ))
    }

    /// Assembles a pipeline from prebuilt parts.
    #[must_use]
    pub fn with_parts(
        paginator: Paginator,
        fetcher: RecordFetcher,
        transformer: Transformer,
        dispatcher: SinkDispatcher,
        max_downloads: u64,
    ) -> Self {
        Self {
            paginator,
            fetcher,
            transformer,
            dispatcher,
            max_downloads,
        }
    }

    /// Runs the paging loop to completion.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`HarvestError`]; recoverable failures are
    /// counted in [`HarvestStats`] instead.
    #[instrument(skip(self), fields(max_downloads = self.max_downloads))]
    pub async fn run(&mut self) -> Result<HarvestStats, HarvestError> {
        let mut state = RunState::new(self.max_downloads);
        let mut stats = HarvestStats::default();

        let result = self.page_loop(&mut state, &mut stats).await;
        self.dispatcher.finish().await;

        stats.attempted = state.cursor();
        stats.target_total = state.target_total();

        match result {
            Ok(()) => {
                debug!(?stats, "harvest loop finished");
                Ok(stats)
            }
            Err(error) => {
                warn!(
                    cursor = state.cursor(),
                    target_total = state.target_total(),
                    error = %error,
                    "harvest aborted"
                );
                Err(error)
            }
        }
    }

    async fn page_loop(
        &mut self,
        state: &mut RunState,
        stats: &mut HarvestStats,
    ) -> Result<(), HarvestError> {
        while let Some(page) = self.paginator.next_page(state).await? {
            stats.pages += 1;

            if page.is_empty() {
                if !state.is_done() {
                    warn!(
                        cursor = state.cursor(),
                        target_total = state.target_total(),
                        "listing returned an empty page before reaching the target, stopping"
                    );
                }
                break;
            }

            for identifier in &page.records {
                state.advance();
                match self.process_record(identifier).await {
                    Ok(outcome) => {
                        stats.fetched += 1;
                        stats.sink_failures += outcome.failed.len() as u64;
                    }
                    Err(error) if error.severity() == Severity::Recoverable => {
                        warn!(identifier = %identifier, error = %error, "skipping record");
                        stats.fetch_failures += 1;
                    }
                    Err(error) => return Err(error),
                }
            }

            let next = page
                .next_cursor
                .map_or_else(|| "unknown".to_string(), |n| n.to_string());
            info!(
                "Downloaded {}/{}. Next record number is {}",
                state.cursor(),
                state.target_total(),
                next
            );
        }

        Ok(())
    }

    /// Fetch, transform and dispatch one record.
    async fn process_record(
        &mut self,
        identifier: &Identifier,
    ) -> Result<DispatchOutcome, HarvestError> {
        let body = self
            .fetcher
            .fetch(identifier)
            .await
            .map_err(|e| HarvestError::record(identifier.as_str(), e))?;

        let body = self.transformer.apply(body, identifier.as_str()).await;
        let record = Record::new(identifier.clone(), body);
        let outcome = self.dispatcher.dispatch(&record).await;
        debug!(identifier = %identifier, ?outcome, "record dispatched");
        Ok(outcome)
    }
}

/// Builds the enabled sinks in dispatch order: index, file, CSV.
async fn build_dispatcher(
    config: &HarvestConfig,
    output_dir: &Path,
) -> Result<SinkDispatcher, HarvestError> {
    let out = &config.output;
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();

    if out.elasticsearch.enable {
        let es = &out.elasticsearch;
        let sink = IndexSink::new(&es.host, &es.index, &es.login, &es.pwd)
            .map_err(|source| HarvestError::SinkSetup {
                sink: "index",
                source,
            })?;
        sink.log_server_info().await;
        sinks.push(Box::new(sink));
    }

    if out.file_system.enable {
        let sink = FileSink::create(output_dir, &config.connection.db, &out.file_system.json_dir)
            .map_err(|source| HarvestError::SinkSetup {
                sink: "file",
                source,
            })?;
        sinks.push(Box::new(sink));
    }

    if out.csv.enable {
        let sink = TabularSink::create(output_dir.join(&out.csv.file)).map_err(|source| {
            HarvestError::SinkSetup {
                sink: "csv",
                source,
            }
        })?;
        sinks.push(Box::new(sink));
    }

    if sinks.is_empty() {
        warn!("no sinks enabled; records will be fetched and discarded");
    }

    Ok(SinkDispatcher::new(sinks))
}
