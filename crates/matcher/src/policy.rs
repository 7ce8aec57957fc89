//! Match predicates. A policy turns a raw historical row into its own record
//! type once, then judges that record against each daily record.

use crate::model::{CountRecord, DailyRecord, HistoricalRecord};
use crate::record::{parse_count_row, parse_historical};
use crate::schema::ColumnMap;

/// Codes reserved for the aggregate fields; never compared.
pub const RESERVED_CODES: [&str; 2] = ["Total", "WinPercent"];

/// A pure daily/historical predicate. Shared read-only by every worker.
pub trait Policy: Sync {
    type Record;

    /// Decode a raw historical row. `None` rejects the row without matching.
    fn prepare(&self, row: &[String]) -> Option<Self::Record>;

    fn matches(&self, daily: &DailyRecord, record: &Self::Record) -> bool;
}

// ---------------------------------------------------------------------------
// Column policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnCheck {
    Skipped,
    Match,
    Mismatch,
}

/// Conjunction over the historical `code, value` pairs: range columns test
/// `low <= daily <= high`, all others compare text exactly.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPolicy<'a> {
    columns: &'a ColumnMap,
    require_same_id: bool,
    require_comparable_column: bool,
}

impl<'a> ColumnPolicy<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self {
            columns,
            require_same_id: true,
            require_comparable_column: false,
        }
    }

    pub fn require_same_id(mut self, on: bool) -> Self {
        self.require_same_id = on;
        self
    }

    /// When set, a pair with every column skipped is rejected instead of
    /// counting as a (vacuous) match.
    pub fn require_comparable_column(mut self, on: bool) -> Self {
        self.require_comparable_column = on;
        self
    }

    fn check_column(&self, daily: &DailyRecord, code: &str, hist_value: &str) -> ColumnCheck {
        if RESERVED_CODES.contains(&code) {
            return ColumnCheck::Skipped;
        }

        let Some(daily_value) = self.columns.offset(code).and_then(|off| daily.value(off)) else {
            return ColumnCheck::Skipped;
        };

        if daily_value.is_empty() || hist_value.is_empty() {
            return ColumnCheck::Skipped;
        }

        let hit = if self.columns.is_range_comparable(code) {
            range_match(daily_value, hist_value)
        } else {
            daily_value == hist_value
        };

        if hit {
            ColumnCheck::Match
        } else {
            ColumnCheck::Mismatch
        }
    }
}

impl Policy for ColumnPolicy<'_> {
    type Record = HistoricalRecord;

    fn prepare(&self, row: &[String]) -> Option<HistoricalRecord> {
        Some(parse_historical(row))
    }

    fn matches(&self, daily: &DailyRecord, record: &HistoricalRecord) -> bool {
        if self.require_same_id && daily.id() != record.id {
            return false;
        }

        let mut compared = 0usize;
        for (code, hist_value) in &record.pairs {
            match self.check_column(daily, code, hist_value) {
                ColumnCheck::Skipped => {}
                ColumnCheck::Match => compared += 1,
                ColumnCheck::Mismatch => return false,
            }
        }

        compared > 0 || !self.require_comparable_column
    }
}

/// Parse `"<low>-<high>"` with both bounds non-negative integers.
pub fn parse_range(s: &str) -> Option<(i64, i64)> {
    let (low, high) = s.split_once('-')?;
    let bound = |part: &str| -> Option<i64> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    Some((bound(low)?, bound(high)?))
}

/// Daily integer within the inclusive historical range. Any parse failure
/// is a mismatch.
pub fn range_match(daily_value: &str, hist_range: &str) -> bool {
    let Some((low, high)) = parse_range(hist_range) else {
        return false;
    };
    match daily_value.trim().parse::<i64>() {
        Ok(v) => low <= v && v <= high,
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Count policy
// ---------------------------------------------------------------------------

/// Same entity id, and the daily values under the row's codes sum to the
/// expected count. Always sums every code before comparing.
#[derive(Debug, Clone, Copy)]
pub struct CountPolicy<'a> {
    columns: &'a ColumnMap,
}

impl<'a> CountPolicy<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self { columns }
    }

    /// Sum of the daily integers under `codes`. Unknown codes, short rows and
    /// non-integer values contribute 0.
    pub fn daily_sum(&self, daily: &DailyRecord, codes: &[String]) -> i64 {
        codes
            .iter()
            .filter_map(|code| self.columns.offset(code))
            .filter_map(|off| daily.value(off))
            .map(|v| v.trim().parse::<i64>().unwrap_or(0))
            .fold(0i64, i64::saturating_add)
    }
}

impl Policy for CountPolicy<'_> {
    type Record = CountRecord;

    fn prepare(&self, row: &[String]) -> Option<CountRecord> {
        match parse_count_row(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::trace!(error = %e, "skipping count row");
                None
            }
        }
    }

    fn matches(&self, daily: &DailyRecord, record: &CountRecord) -> bool {
        if daily.id() != record.id {
            return false;
        }
        self.daily_sum(daily, &record.codes) == record.expected
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
