//! Write demand records as a UTF-8 CSV with a byte-order mark.

use std::io::Write;

use camino::Utf8Path;
use log::info;

use crate::error::DemandWriteError;
use crate::record::{DEMAND_COLUMNS, DemandRecord};

/// Byte-order mark written ahead of the header so spreadsheet tools detect UTF-8.
const UTF8_BOM: &str = "\u{feff}";

/// Write `records` to `path`, creating parent directories.
///
/// # Errors
/// Returns [`DemandWriteError`] when the file cannot be created or written.
pub fn write_demand_csv(path: &Utf8Path, records: &[DemandRecord]) -> Result<(), DemandWriteError> {
    let file = moca_fs::create_utf8_file(path).map_err(|source| DemandWriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_demand_to(file, records)?;
    info!("wrote {} demand records to {path}", records.len());
    Ok(())
}

/// Write `records` as CSV to `writer`.
///
/// # Errors
/// Returns [`DemandWriteError`] when a record cannot be written.
pub fn write_demand_to<W: Write>(mut writer: W, records: &[DemandRecord]) -> Result<(), DemandWriteError> {
    writer
        .write_all(UTF8_BOM.as_bytes())
        .map_err(|source| DemandWriteError::Io { source })?;
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(DEMAND_COLUMNS)
        .map_err(|source| DemandWriteError::Csv { source })?;
    for record in records {
        csv_writer
            .serialize(record)
            .map_err(|source| DemandWriteError::Csv { source })?;
    }
    csv_writer
        .flush()
        .map_err(|source| DemandWriteError::Io { source })
}
