//! Tag-to-score enrichment for bus stops.
//!
//! The crate turns each stop's free-text tags into category scores:
//! - **Resolution** looks a tag up in the reference
//!   [`Taxonomy`](moca_core::Taxonomy) by exact name and, failing that,
//!   embeds it through an [`EmbeddingOracle`](moca_core::EmbeddingOracle)
//!   and keeps the nearest reference rows by cosine similarity.
//! - **Aggregation** blends the resolved rows into one
//!   [`ScoreVector`](moca_core::ScoreVector) per stop, averaging over the
//!   tag count and electing a stop type by majority vote.
//! - **Orchestration** runs both over a whole
//!   [`PointsTable`](moca_core::PointsTable), memoising and retrying oracle
//!   calls, and reports stops it had to flag or skip.
//!
//! The embedding cache can be saved to `embeddings.bin` with
//! [`write_embedding_cache`] and reloaded on the next run, provided the
//! embedding model and endpoint are unchanged.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use moca_core::test_support::StubOracle;
//! use moca_scorer::{
//!     CacheOrigin, CachingOracle, Enricher, read_embedding_cache, write_embedding_cache,
//! };
//! # use moca_core::{PointsTable, Taxonomy};
//! # fn demo(table: &PointsTable, taxonomy: &Taxonomy) -> Result<(), Box<dyn std::error::Error>> {
//!
//! let path = Utf8Path::new("data/embeddings.bin");
//! let origin = CacheOrigin::new("nomic-embed-text", "http://localhost:11434");
//! let oracle = CachingOracle::with_entries(StubOracle::new(384), read_embedding_cache(path, &origin)?);
//! let enrichment = Enricher::new(taxonomy, &oracle, moca_scorer::DEFAULT_NEIGHBOURS).enrich(table);
//! write_embedding_cache(path, &origin, &oracle.snapshot())?;
//! println!("{} rows", enrichment.rows.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregate;
mod cache;
mod enrich;
mod error;
mod persist;
mod report;
mod resolver;
mod retry;
mod vote;

pub use aggregate::{ScoreAccumulator, fallback_weights};
pub use cache::CachingOracle;
pub use enrich::{EnrichOptions, EnrichedRow, Enricher, Enrichment, StopOutcome, enrich_points};
pub use error::{AggregationError, CacheFileError, OptionsError};
pub use persist::{
    CACHE_MAGIC, CACHE_VERSION, CacheOrigin, read_embedding_cache, write_embedding_cache,
};
pub use report::{EnrichmentReport, RowIssue, RowIssueRecord};
pub use resolver::{
    DEFAULT_NEIGHBOURS, Resolution, SimilarityMatch, TagResolver, nearest_neighbours,
    top_k_indices,
};
pub use retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy, RetryingOracle};
pub use vote::VoteTally;
