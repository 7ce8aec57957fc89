// CSV import/export

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zmatcher_engine::model::{Row, Table};

use crate::error::TableError;

pub const DEFAULT_DELIMITER: u8 = b',';

pub fn read(path: &Path, delimiter: u8) -> Result<Table, TableError> {
    let content = read_file_as_utf8(path)?;
    parse(&content, delimiter).map_err(|e| TableError::decode(path, e.to_string()))
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback for
/// Excel-exported CSVs). A leading BOM is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, TableError> {
    let mut file = File::open(path).map_err(|e| TableError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| TableError::io(path, e))?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::debug!(path = %path.display(), "not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// Split on `delimiter` with quoting off: a quoted field containing the
/// delimiter is split like any other. Each cell is then stripped of
/// surrounding quotes and whitespace.
pub fn parse(content: &str, delimiter: u8) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(content.as_bytes());

    let mut table = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Row = record.iter().map(clean_cell).collect();
        table.push(row);
    }
    Ok(table)
}

fn clean_cell(field: &str) -> String {
    field
        .trim_matches(|c: char| c == '"' || c.is_whitespace())
        .to_string()
}

/// Every cell is quote-wrapped; rows keep their own width.
pub fn write(table: &[Row], path: &Path, delimiter: u8) -> Result<(), TableError> {
    let file = File::create(path).map_err(|e| TableError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file);

    for row in table {
        writer
            .write_record(row)
            .map_err(|e| TableError::encode(path, e.to_string()))?;
    }

    writer.flush().map_err(|e| TableError::io(path, e))?;
    Ok(())
}
