//! Facade crate for the Moca on-demand bus enrichment engine.
//!
//! This crate re-exports the core domain types and the enrichment pipeline,
//! and exposes the CSV/HTTP data layer and the synthetic demand generator
//! behind feature flags.

#![forbid(unsafe_code)]

pub use moca_core::{
    Category, CategoryScores, EmbeddingOracle, OracleError, PointsTable, ReferenceTag, ScoreVector,
    Stop, Taxonomy, cosine_similarity,
};
pub use moca_scorer::{
    CachingOracle, EnrichOptions, EnrichedRow, Enricher, Enrichment, EnrichmentReport,
    RetryPolicy, RetryingOracle, RowIssue, enrich_points,
};

#[cfg(feature = "http")]
pub use moca_data::{
    HttpEmbeddingOracle, HttpPointsSource, PointsSource, fetch_or_load_points, load_points,
    load_taxonomy, write_enriched,
};

#[cfg(feature = "demand")]
pub use moca_demand::{DemandRecord, DemandSummary, SimulationConfig, simulate, write_demand_csv};
