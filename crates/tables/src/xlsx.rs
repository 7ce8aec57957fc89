// Excel import (xlsx, xls) and export (xlsx only)
//
// Import reads the first worksheet as plain text cells. Export writes every
// cell as a string into a single sheet.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Workbook, XlsxError};
use zmatcher_engine::model::{Row, Table};

use crate::error::TableError;

/// Excel sheet limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Read the first worksheet. Cells keep their absolute column: a sheet whose
/// data starts at column C gets two empty leading cells per row. Leading
/// empty rows are not materialised.
pub fn read(path: &Path) -> Result<Table, TableError> {
    if !path.is_file() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| TableError::decode(path, format!("failed to open Excel file: {e}")))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(TableError::decode(path, "Excel file contains no sheets"));
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TableError::decode(path, format!("failed to read sheet '{sheet_name}': {e}")))?;

    // Range start offset (data may not begin at A1)
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let lead = start_col as usize;

    let table = range
        .rows()
        .map(|cells| {
            let mut row: Row = Vec::with_capacity(lead + cells.len());
            row.resize(lead, String::new());
            row.extend(cells.iter().map(cell_text));
            row
        })
        .collect();

    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Write `table` as text cells into one worksheet.
pub fn write(table: &[Row], path: &Path) -> Result<(), TableError> {
    if table.len() > MAX_ROWS {
        return Err(TableError::encode(
            path,
            format!("{} rows exceeds the Excel limit of {MAX_ROWS}", table.len()),
        ));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row_idx, row) in table.iter().enumerate() {
        if row.len() > MAX_COLS {
            return Err(TableError::encode(
                path,
                format!("row {} has {} cells, Excel limit is {MAX_COLS}", row_idx + 1, row.len()),
            ));
        }
        for (col_idx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .map_err(|e| xlsx_error(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| xlsx_error(path, e))?;
    Ok(())
}

fn xlsx_error(path: &Path, err: XlsxError) -> TableError {
    match err {
        XlsxError::IoError(e) => TableError::io(path, e),
        other => TableError::encode(path, other.to_string()),
    }
}
