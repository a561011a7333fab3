//! Fan-out of records to the enabled sinks.

use tracing::{debug, warn};

use super::{Record, Sink};

/// Result of offering one record to every sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Names of sinks that accepted the record.
    pub written: Vec<String>,
    /// Names of sinks whose write failed.
    pub failed: Vec<String>,
}

impl DispatchOutcome {
    /// Returns true if no sink failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered set of sinks built once per run.
#[derive(Default)]
pub struct SinkDispatcher {
    sinks: Vec<Box<dyn Sink>>,
}

impl SinkDispatcher {
    /// Creates a dispatcher over `sinks`, kept in the given order.
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Appends a sink after the existing ones.
    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Number of enabled sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if no sink is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Sink names in dispatch order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Offers `record` to every sink in order.
    ///
    /// A failing sink is logged and skipped; the remaining sinks still run.
    pub async fn dispatch(&mut self, record: &Record) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for sink in &mut self.sinks {
            let name = sink.name().to_string();
            match sink.write(record).await {
                Ok(()) => {
                    debug!(sink = %name, identifier = %record.identifier, "sink write ok");
                    outcome.written.push(name);
                }
                Err(error) => {
                    warn!(
                        sink = %name,
                        identifier = %record.identifier,
                        formatted_id = %record.formatted_id,
                        error = %error,
                        "sink write failed"
                    );
                    outcome.failed.push(name);
                }
            }
        }

        outcome
    }

    /// Flushes every sink at the end of the run. Failures are logged.
    pub async fn finish(&mut self) {
        for sink in &mut self.sinks {
            if let Err(error) = sink.finish().await {
                warn!(sink = sink.name(), error = %error, "sink finish failed");
            }
        }
    }
}

impl std::fmt::Debug for SinkDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkDispatcher")
            .field("sinks", &self.names())
            .finish()
    }
}
