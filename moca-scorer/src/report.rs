//! Per-run accounting of emitted, flagged and skipped stops.

use log::{info, warn};
use moca_core::{OracleError, TagListError};
use thiserror::Error;

/// A problem encountered while enriching a single stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    /// The `tags` field could not be parsed; the stop is skipped.
    #[error("malformed tag list")]
    MalformedTagList {
        /// Parser error.
        #[source]
        source: TagListError,
    },
    /// The row's field count differs from the header's; the stop is skipped.
    #[error("row has {found} fields, expected {expected}")]
    RaggedRow {
        /// Header width.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The stop has no tags; a zero row is emitted and flagged.
    #[error("empty tag list")]
    EmptyTagList,
    /// The oracle failed for one of the stop's tags; the stop is skipped.
    #[error("embedding failed for tag '{tag}'")]
    OracleFailure {
        /// Tag that could not be embedded.
        tag: String,
        /// Final oracle error after retries.
        #[source]
        source: OracleError,
    },
}

impl RowIssue {
    /// Report whether the stop still produces an output row.
    #[must_use]
    pub const fn emits_row(&self) -> bool {
        matches!(self, Self::EmptyTagList)
    }
}

/// A [`RowIssue`] tied to the stop's input position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssueRecord {
    /// Zero-based position of the stop in the input.
    pub position: usize,
    /// What went wrong.
    pub issue: RowIssue,
}

/// Summary of an enrichment run.
///
/// `processed == emitted + skipped`; flagged rows are a subset of the
/// emitted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Stops read from the input.
    pub processed: usize,
    /// Rows written to the output.
    pub emitted: usize,
    /// Emitted rows carrying a sentinel score.
    pub flagged: usize,
    /// Stops left out of the output.
    pub skipped: usize,
    /// Every issue in input order.
    pub issues: Vec<RowIssueRecord>,
}

impl EnrichmentReport {
    pub(crate) fn record_emitted(&mut self) {
        self.processed = self.processed.saturating_add(1);
        self.emitted = self.emitted.saturating_add(1);
    }

    pub(crate) fn record_issue(&mut self, position: usize, issue: RowIssue) {
        self.processed = self.processed.saturating_add(1);
        if issue.emits_row() {
            self.emitted = self.emitted.saturating_add(1);
            self.flagged = self.flagged.saturating_add(1);
        } else {
            self.skipped = self.skipped.saturating_add(1);
        }
        self.issues.push(RowIssueRecord { position, issue });
    }

    /// Report whether every stop was enriched without issue.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Log the run totals, warning when any stop was flagged or skipped.
    pub fn log_summary(&self) {
        info!(
            "enriched {} of {} stops ({} flagged, {} skipped)",
            self.emitted, self.processed, self.flagged, self.skipped
        );
        if !self.is_clean() {
            warn!(
                "{} stops need attention; first issue at row {}",
                self.issues.len(),
                self.issues.first().map_or(0, |record| record.position)
            );
        }
    }
}
