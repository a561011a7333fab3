//! Per-run paging state.

use tracing::debug;

/// Cursor and target total for one harvest run.
///
/// `cursor` never decreases and `target_total` never increases. The run is
/// finished once `cursor >= target_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    cursor: u64,
    target_total: u64,
}

impl RunState {
    /// Starts a run capped at `max_downloads` records.
    #[must_use]
    pub fn new(max_downloads: u64) -> Self {
        Self {
            cursor: 0,
            target_total: max_downloads,
        }
    }

    /// Number of identifiers consumed so far.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Current effective total.
    #[must_use]
    pub fn target_total(&self) -> u64 {
        self.target_total
    }

    /// 1-based `startRecord` for the next listing request.
    #[must_use]
    pub fn start_record(&self) -> u64 {
        self.cursor + 1
    }

    /// Returns true once no further page should be requested.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cursor >= self.target_total
    }

    /// Tightens the target to the server's reported total if it is smaller.
    ///
    /// Returns true if the target changed.
    pub fn observe_total(&mut self, reported_total: u64) -> bool {
        if reported_total < self.target_total {
            debug!(
                previous = self.target_total,
                reported_total, "tightening target total"
            );
            self.target_total = reported_total;
            true
        } else {
            false
        }
    }

    /// Marks one identifier as consumed, whether or not its record was fetched.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }
}
