//! Raw row -> record decoding. Every function here is total: malformed rows
//! degrade to partial records (or a `RowParseError` value) and never panic.

use std::collections::BTreeMap;

use crate::error::RowParseError;
use crate::model::{CountRecord, DailyRecord, DailyTable, HistoricalRecord, Row};
use crate::schema::ColumnMap;

/// Minimum width of a count-layout historical row.
pub const COUNT_ROW_MIN_CELLS: usize = 5;

// ---------------------------------------------------------------------------
// Daily
// ---------------------------------------------------------------------------

/// Slice each raw daily row down to `[id] ++ row[daily_slice]`, clamped to the
/// row length. Rows with no cells are left out.
pub fn filter_daily<'a>(raw: &'a [Row], columns: &ColumnMap) -> DailyTable<'a> {
    let slice = columns.daily_slice();
    let records = raw
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.is_empty())
        .map(|(row_index, row)| {
            let mut cells = Vec::with_capacity(columns.len() + 1);
            cells.push(row[0].clone());
            let start = *slice.start();
            let end = (*slice.end() + 1).min(row.len());
            if start < end {
                cells.extend_from_slice(&row[start..end]);
            }
            DailyRecord { row_index, cells }
        })
        .collect();

    DailyTable { raw, records }
}

// ---------------------------------------------------------------------------
// Historical: pair layout
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PairDecode {
    pub pairs: BTreeMap<String, String>,
    /// Trailing code without a value (odd-length input); not part of `pairs`.
    pub dangling: Option<String>,
}

/// Decode alternating `code, value` cells. Input must be even-length to be
/// fully consumed; an unpaired last cell is reported in `dangling` and dropped.
pub fn decode_pairs(cells: &[String]) -> PairDecode {
    let mut chunks = cells.chunks_exact(2);
    let pairs = (&mut chunks)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    let dangling = chunks.remainder().first().cloned();
    PairDecode { pairs, dangling }
}

/// Parse `id, code, value, ..., Total, WinPercent`.
///
/// The pair region is cells `[1, len - 2)`. Aggregates are the last two cells
/// and are only read when the row has at least 3 cells.
pub fn parse_historical(row: &[String]) -> HistoricalRecord {
    let id = row.first().cloned().unwrap_or_default();

    let (total, win_percent) = if row.len() >= 3 {
        (row[row.len() - 2].clone(), row[row.len() - 1].clone())
    } else {
        (String::new(), String::new())
    };

    let region = row.get(1..row.len().saturating_sub(2)).unwrap_or(&[]);
    let decoded = decode_pairs(region);
    if let Some(ref code) = decoded.dangling {
        tracing::trace!(id = %id, code = %code, "dropping unpaired historical cell");
    }

    HistoricalRecord {
        id,
        pairs: decoded.pairs,
        total,
        win_percent,
    }
}

// ---------------------------------------------------------------------------
// Historical: count layout
// ---------------------------------------------------------------------------

/// Split a code string into 2-character codes; a trailing odd character is dropped.
pub fn split_codes(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks_exact(2)
        .map(|pair| pair.iter().collect())
        .collect()
}

/// Parse `id, codes, count, _, WinPercent`.
pub fn parse_count_row(row: &[String]) -> Result<CountRecord, RowParseError> {
    if row.len() < COUNT_ROW_MIN_CELLS {
        return Err(RowParseError::TooShort {
            len: row.len(),
            required: COUNT_ROW_MIN_CELLS,
        });
    }

    let expected = row[2]
        .trim()
        .parse::<i64>()
        .map_err(|_| RowParseError::BadCount(row[2].clone()))?;

    Ok(CountRecord {
        id: row[0].clone(),
        codes: split_codes(&row[1]),
        expected,
        win_percent: row[4].clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
