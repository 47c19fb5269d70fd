//! Core domain types for the Moca stop enrichment engine.
//!
//! These models validate on construction so that the resolver and
//! aggregator can trust their inputs. Constructors return `Result` to
//! surface invalid input early.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod category;
pub mod oracle;
mod score;
mod similarity;
mod stop;
mod taxonomy;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use category::{CATEGORY_COUNT, Category, CategoryScores};
pub use oracle::{EmbeddingOracle, OracleError};
pub use score::ScoreVector;
pub use similarity::cosine_similarity;
pub use stop::{PointsTable, PointsTableError, Stop, TAGS_COLUMN, TagListError, parse_tag_list};
pub use taxonomy::{ReferenceTag, Taxonomy, TaxonomyError};
