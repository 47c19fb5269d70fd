//! Data access for the Moca enrichment engine.
//!
//! Responsibilities:
//! - Load the reference taxonomy and the points table from CSV.
//! - Fetch the points table over HTTP when no local cache exists.
//! - Embed unknown tags through an HTTP embedding service.
//! - Write the enriched table back to CSV.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `moca-scorer`).
//! - Present synchronous interfaces; async HTTP is bridged internally.
//!
//! Invariants:
//! - No global mutable state.
//! - Every filesystem access goes through `moca-fs`.

#![forbid(unsafe_code)]

mod http;
pub mod oracle;
pub mod points;
mod table;
mod taxonomy;

#[doc(hidden)]
pub mod test_support;

pub use http::ClientBuildError;
pub use oracle::{DEFAULT_BASE_URL, DEFAULT_MODEL, HttpEmbeddingOracle, HttpEmbeddingOracleConfig};
pub use points::{
    DEFAULT_POINTS_ENDPOINT, FetchError, HttpPointsSource, HttpPointsSourceConfig,
    PointsLoadError, PointsSource, fetch_or_load_points, load_points, read_points,
};
pub use table::{TableWriteError, enriched_header, write_enriched, write_enriched_to};
pub use taxonomy::{
    EMBEDDING_COLUMN, NAME_COLUMN, STOP_TYPE_COLUMN, TaxonomyLoadError, load_taxonomy, read_taxonomy,
};

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "moca-engine/0.1";

/// UTF-8 byte-order mark some spreadsheet exports put before the first header.
pub(crate) const BYTE_ORDER_MARK: char = '\u{feff}';
