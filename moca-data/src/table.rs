//! Write the enriched points table as CSV.
//!
//! Columns are the input columns in input order, then one column per
//! [`Category`] and finally `stop_type`.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use moca_core::Category;
use moca_scorer::Enrichment;
use thiserror::Error;

use crate::taxonomy::STOP_TYPE_COLUMN;

/// Errors raised while writing the enriched table.
#[derive(Debug, Error)]
pub enum TableWriteError {
    /// The output file could not be created.
    #[error("failed to create enriched table {path}")]
    Create {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be written.
    #[error("failed to write enriched CSV")]
    Csv {
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// Buffered output could not be flushed.
    #[error("failed to flush enriched CSV")]
    Flush {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Output header for a table whose input header is `columns`.
///
/// # Examples
/// ```
/// use moca_data::enriched_header;
///
/// let header = enriched_header(&["stop_id".to_owned(), "tags".to_owned()]);
/// assert_eq!(header.len(), 2 + 14 + 1);
/// assert_eq!(header[2], "education_score");
/// assert_eq!(header.last().map(String::as_str), Some("stop_type"));
/// ```
#[must_use]
pub fn enriched_header(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .cloned()
        .chain(Category::ALL.iter().map(|category| category.column_name().to_owned()))
        .chain(std::iter::once(STOP_TYPE_COLUMN.to_owned()))
        .collect()
}

/// Write `enrichment` to `path`, creating parent directories.
///
/// # Errors
/// Returns [`TableWriteError`] when the file cannot be created or written.
pub fn write_enriched(path: &Utf8Path, enrichment: &Enrichment) -> Result<(), TableWriteError> {
    let file = moca_fs::create_utf8_file(path).map_err(|source| TableWriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_enriched_to(file, enrichment)?;
    info!("wrote {} enriched rows to {path}", enrichment.rows.len());
    Ok(())
}

/// Write `enrichment` as CSV to `writer`.
///
/// # Errors
/// Returns [`TableWriteError`] when a record cannot be written.
pub fn write_enriched_to<W: Write>(writer: W, enrichment: &Enrichment) -> Result<(), TableWriteError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(enriched_header(&enrichment.columns))
        .map_err(|source| TableWriteError::Csv { source })?;

    for row in &enrichment.rows {
        let scores = row.score.scores.iter().map(|(_, value)| value.to_string());
        let record = row
            .attributes
            .iter()
            .cloned()
            .chain(scores)
            .chain(std::iter::once(row.score.stop_type.clone()));
        csv_writer
            .write_record(record)
            .map_err(|source| TableWriteError::Csv { source })?;
    }
    csv_writer
        .flush()
        .map_err(|source| TableWriteError::Flush { source })
}
