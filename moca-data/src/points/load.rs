//! Read the points table from CSV.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use moca_core::{PointsTable, PointsTableError};
use thiserror::Error;

use crate::BYTE_ORDER_MARK;

/// Errors raised while loading the points table.
#[derive(Debug, Error)]
pub enum PointsLoadError {
    /// The points file could not be opened.
    #[error("failed to open points table {path}")]
    Open {
        /// Path that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV could not be read.
    #[error("failed to read points CSV")]
    Csv {
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// The rows do not form a valid points table.
    #[error("invalid points table")]
    Table {
        /// The violated invariant.
        #[source]
        source: PointsTableError,
    },
}

/// Load the points table stored at `path`.
///
/// # Errors
/// Returns [`PointsLoadError::Open`] when the file cannot be opened and the
/// errors of [`read_points`] for malformed contents.
pub fn load_points(path: &Utf8Path) -> Result<PointsTable, PointsLoadError> {
    let file = moca_fs::open_utf8_file(path).map_err(|source| PointsLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_points(file)?;
    info!("loaded {} stops from {path}", table.len());
    Ok(table)
}

/// Read a points CSV from `reader`.
///
/// Every column is kept verbatim; the `tags` column is parsed later, per
/// stop, so one malformed list or short row does not reject the whole
/// table. A leading byte-order mark on the first header is dropped.
///
/// # Errors
/// Returns [`PointsLoadError`] when the CSV is unreadable or the `tags`
/// column is missing.
pub fn read_points<R: Read>(reader: R) -> Result<PointsTable, PointsLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<String> = csv_reader
        .headers()
        .map_err(|source| PointsLoadError::Csv { source })?
        .iter()
        .map(|header| header.trim_start_matches(BYTE_ORDER_MARK).to_owned())
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|source| PointsLoadError::Csv { source })?;
        rows.push(record.iter().map(str::to_owned).collect());
    }
    PointsTable::new(columns, rows).map_err(|source| PointsLoadError::Table { source })
}
