//! Enrich every stop in a points table.
//!
//! Stops are processed one at a time in input order. Each stop's tags are
//! parsed, resolved and aggregated independently; the only state shared
//! between stops is the embedding cache wrapped around the oracle.

use std::num::NonZeroUsize;

use log::{debug, warn};
use moca_core::{EmbeddingOracle, PointsTable, ScoreVector, Stop, Taxonomy};

use crate::aggregate::ScoreAccumulator;
use crate::cache::CachingOracle;
use crate::error::OptionsError;
use crate::report::{EnrichmentReport, RowIssue};
use crate::resolver::{DEFAULT_NEIGHBOURS, TagResolver};
use crate::retry::{RetryPolicy, RetryingOracle};

/// Settings for an enrichment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Nearest reference rows blended for an unknown tag.
    pub neighbours: usize,
    /// Retry policy applied to oracle calls.
    pub retry: RetryPolicy,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            neighbours: DEFAULT_NEIGHBOURS.get(),
            retry: RetryPolicy::default(),
        }
    }
}

impl EnrichOptions {
    /// Set the neighbour count.
    #[must_use]
    pub const fn with_neighbours(mut self, neighbours: usize) -> Self {
        self.neighbours = neighbours;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the settings, returning the neighbour count as non-zero.
    ///
    /// # Errors
    /// Returns [`OptionsError`] when the neighbour count or attempt count
    /// is zero.
    pub const fn validate(&self) -> Result<NonZeroUsize, OptionsError> {
        if let Err(err) = self.retry.validate() {
            return Err(err);
        }
        match NonZeroUsize::new(self.neighbours) {
            Some(neighbours) => Ok(neighbours),
            None => Err(OptionsError::ZeroNeighbours),
        }
    }
}

/// An output row: the stop's original fields plus its scores.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    /// Zero-based position of the stop in the input.
    pub position: usize,
    /// Original fields in column order.
    pub attributes: Vec<String>,
    /// Aggregated scores.
    pub score: ScoreVector,
}

/// Result of enriching a points table.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Input column headers.
    pub columns: Vec<String>,
    /// Emitted rows in input order.
    pub rows: Vec<EnrichedRow>,
    /// Run summary.
    pub report: EnrichmentReport,
}

/// What happened to one stop.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// The stop was scored normally.
    Scored(ScoreVector),
    /// A sentinel row is emitted and the issue reported.
    Flagged(ScoreVector, RowIssue),
    /// The stop is left out of the output.
    Skipped(RowIssue),
}

/// Runs the resolver and aggregator over stops.
#[derive(Debug)]
pub struct Enricher<'a> {
    resolver: TagResolver<'a>,
}

impl<'a> Enricher<'a> {
    /// Create an enricher over `taxonomy` using `oracle` for unknown tags.
    ///
    /// The oracle is used as given; wrap it in [`CachingOracle`] and
    /// [`RetryingOracle`] to memoise and retry, or call [`enrich_points`].
    pub const fn new(
        taxonomy: &'a Taxonomy,
        oracle: &'a dyn EmbeddingOracle,
        neighbours: NonZeroUsize,
    ) -> Self {
        Self {
            resolver: TagResolver::new(taxonomy, oracle, neighbours),
        }
    }

    /// Enrich every stop in `table`.
    #[must_use]
    pub fn enrich(&self, table: &PointsTable) -> Enrichment {
        let mut rows = Vec::with_capacity(table.len());
        let mut report = EnrichmentReport::default();

        for stop in table.stops() {
            match self.enrich_stop(&stop) {
                StopOutcome::Scored(score) => {
                    report.record_emitted();
                    rows.push(row(&stop, score));
                }
                StopOutcome::Flagged(score, issue) => {
                    warn!("stop at row {} flagged: {issue}", stop.position);
                    report.record_issue(stop.position, issue);
                    rows.push(row(&stop, score));
                }
                StopOutcome::Skipped(issue) => {
                    warn!("stop at row {} skipped: {}", stop.position, describe(&issue));
                    report.record_issue(stop.position, issue);
                }
            }
        }

        report.log_summary();
        Enrichment {
            columns: table.columns().to_vec(),
            rows,
            report,
        }
    }

    /// Enrich a single stop.
    #[must_use]
    pub fn enrich_stop(&self, stop: &Stop<'_>) -> StopOutcome {
        if let Some((expected, found)) = stop.width_mismatch() {
            return StopOutcome::Skipped(RowIssue::RaggedRow { expected, found });
        }
        let tags = match stop.tags() {
            Ok(tags) => tags,
            Err(source) => return StopOutcome::Skipped(RowIssue::MalformedTagList { source }),
        };
        debug!("stop at row {} has {} tags", stop.position, tags.len());

        let mut accumulator = ScoreAccumulator::new();
        for tag in &tags {
            match self.resolver.resolve(tag) {
                Ok(resolution) => accumulator.add(&resolution),
                Err(source) => {
                    return StopOutcome::Skipped(RowIssue::OracleFailure {
                        tag: tag.clone(),
                        source,
                    });
                }
            }
        }

        accumulator.finish().map_or_else(
            |_| StopOutcome::Flagged(ScoreVector::sentinel(), RowIssue::EmptyTagList),
            StopOutcome::Scored,
        )
    }
}

fn row(stop: &Stop<'_>, score: ScoreVector) -> EnrichedRow {
    EnrichedRow {
        position: stop.position,
        attributes: stop.attributes.to_vec(),
        score,
    }
}

/// Render an issue together with its source chain.
fn describe(issue: &RowIssue) -> String {
    match issue {
        RowIssue::MalformedTagList { source } => format!("{issue}: {source}"),
        RowIssue::OracleFailure { source, .. } => format!("{issue}: {source}"),
        RowIssue::RaggedRow { .. } | RowIssue::EmptyTagList => issue.to_string(),
    }
}

/// Enrich `table` with a run-scoped cache and retries around `oracle`.
///
/// # Errors
/// Returns [`OptionsError`] when `options` are invalid. Per-stop problems
/// never fail the run; they are listed in the report instead.
///
/// # Examples
/// ```
/// use moca_core::PointsTable;
/// use moca_core::test_support::{StubOracle, one_hot_taxonomy};
/// use moca_scorer::{EnrichOptions, enrich_points};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let taxonomy = one_hot_taxonomy(3)?;
/// let table = PointsTable::new(
///     vec!["id".into(), "tags".into()],
///     vec![vec!["1".into(), "['tag-1', 'tag-2']".into()]],
/// )?;
/// let enrichment = enrich_points(&table, &taxonomy, &StubOracle::new(3), &EnrichOptions::default())?;
/// assert_eq!(enrichment.rows.len(), 1);
/// assert_eq!(enrichment.rows[0].score.stop_type, "type-1");
/// # Ok(())
/// # }
/// ```
pub fn enrich_points(
    table: &PointsTable,
    taxonomy: &Taxonomy,
    oracle: &dyn EmbeddingOracle,
    options: &EnrichOptions,
) -> Result<Enrichment, OptionsError> {
    let neighbours = options.validate()?;
    let memoised = CachingOracle::new(RetryingOracle::new(oracle, options.retry));
    Ok(Enricher::new(taxonomy, &memoised, neighbours).enrich(table))
}
