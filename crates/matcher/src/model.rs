use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::PolicyConfig;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// One table row: ordered text cells. Row 0 of a table is data like any other.
pub type Row = Vec<String>;

pub type Table = Vec<Row>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The part of a daily row visible to matching: entity id at offset 0,
/// then the schema's column slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    /// Index of the originating row in the raw daily table.
    pub row_index: usize,
    pub cells: Vec<String>,
}

impl DailyRecord {
    pub fn id(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or("")
    }

    /// Value at a record offset, `None` when the row was too short.
    pub fn value(&self, offset: usize) -> Option<&str> {
        self.cells.get(offset).map(String::as_str)
    }
}

/// Daily table prepared once per run: the raw rows (for output) plus the
/// sliced records (for matching).
#[derive(Debug)]
pub struct DailyTable<'a> {
    pub raw: &'a [Row],
    pub records: Vec<DailyRecord>,
}

impl DailyTable<'_> {
    pub fn raw_row(&self, record: &DailyRecord) -> &Row {
        &self.raw[record.row_index]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A historical row in `id, code, value, code, value, ..., Total, WinPercent` layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalRecord {
    pub id: String,
    /// Column code -> value. Sorted by code; a repeated code keeps its last value.
    pub pairs: BTreeMap<String, String>,
    pub total: String,
    pub win_percent: String,
}

/// A historical row in `id, codes, count, _, WinPercent` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRecord {
    pub id: String,
    /// Two-character codes split out of the code string.
    pub codes: Vec<String>,
    pub expected: i64,
    pub win_percent: String,
}

// ---------------------------------------------------------------------------
// Reports + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub name: String,
    pub historical_rows: usize,
    pub chunks: usize,
    pub matches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub historical_rows: usize,
    pub matches: usize,
    pub empty_rows_dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub policy: PolicyConfig,
    pub workers: usize,
    pub daily_rows: usize,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub files: Vec<FileReport>,
    /// Matched rows: full daily row followed by full historical row.
    #[serde(skip)]
    pub rows: Table,
}

impl RunOutcome {
    pub fn has_matches(&self) -> bool {
        !self.rows.is_empty()
    }
}
