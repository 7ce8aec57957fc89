//! Table loading and saving for zmatcher.
//!
//! Tables are plain text grids (`Vec<Vec<String>>`). CSV goes through the
//! `csv` crate, Excel through `calamine` (read) and `rust_xlsxwriter`
//! (write).

pub mod csv;
pub mod discover;
pub mod error;
pub mod format;
pub mod xlsx;

use std::path::Path;

use zmatcher_engine::model::{Row, Table};

pub use discover::historical_files;
pub use error::TableError;
pub use format::{output_path, TableFormat};

/// Load a table, dispatching on the file extension. `delimiter` applies to
/// CSV only.
pub fn read_table(path: &Path, delimiter: u8) -> Result<Table, TableError> {
    let format = TableFormat::from_path(path)
        .ok_or_else(|| TableError::UnsupportedFormat(path.to_path_buf()))?;

    let table = match format {
        TableFormat::Csv => csv::read(path, delimiter)?,
        TableFormat::Xlsx | TableFormat::Xls => xlsx::read(path)?,
    };

    tracing::debug!(path = %path.display(), rows = table.len(), "table loaded");
    Ok(table)
}

/// Save a table, dispatching on the file extension.
pub fn write_table(table: &[Row], path: &Path, delimiter: u8) -> Result<(), TableError> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => csv::write(table, path, delimiter)?,
        Some(TableFormat::Xlsx) => xlsx::write(table, path)?,
        Some(TableFormat::Xls) | None => {
            return Err(TableError::UnsupportedFormat(path.to_path_buf()))
        }
    }

    tracing::debug!(path = %path.display(), rows = table.len(), "table written");
    Ok(())
}
