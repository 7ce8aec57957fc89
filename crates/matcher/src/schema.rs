//! Positional schema: which logical column codes exist, where each one sits in a
//! daily record, and which of them hold ranges.
//!
//! A daily record is cell 0 (entity id) followed by the raw daily cells
//! `daily_first_column ..= daily_first_column + codes.len() - 1`. The code at
//! enumeration index `i` therefore lives at record offset `i + 1`.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

pub const STANDARD_CODES: [&str; 22] = [
    "AP", "AQ", "AR", "AS", "AT", "AU", "AV", "AW", "AX", "AY", "AZ", "BA", "BB", "BC", "BD",
    "BE", "BF", "BG", "BH", "BI", "BJ", "BK",
];

/// "Degree" columns: historical value is an inclusive `low-high` range.
pub const STANDARD_RANGE_CODES: [&str; 11] = [
    "AQ", "AS", "AU", "AW", "AY", "BA", "BC", "BE", "BG", "BI", "BK",
];

pub const DEFAULT_DAILY_FIRST_COLUMN: usize = 41;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Raw daily column holding the first code's value.
    #[serde(default = "default_daily_first_column")]
    pub daily_first_column: usize,
    #[serde(default = "standard_codes")]
    pub codes: Vec<String>,
    #[serde(default = "standard_range_codes")]
    pub range_codes: Vec<String>,
}

fn default_daily_first_column() -> usize {
    DEFAULT_DAILY_FIRST_COLUMN
}

fn standard_codes() -> Vec<String> {
    STANDARD_CODES.iter().map(|c| c.to_string()).collect()
}

fn standard_range_codes() -> Vec<String> {
    STANDARD_RANGE_CODES.iter().map(|c| c.to_string()).collect()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            daily_first_column: DEFAULT_DAILY_FIRST_COLUMN,
            codes: standard_codes(),
            range_codes: standard_range_codes(),
        }
    }
}

impl SchemaConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.codes.is_empty() {
            return Err(MatchError::ConfigValidation(
                "schema.codes must not be empty".into(),
            ));
        }

        if self.daily_first_column == 0 {
            return Err(MatchError::ConfigValidation(
                "schema.daily_first_column must be >= 1 (column 0 is the entity id)".into(),
            ));
        }

        let mut seen = HashSet::new();
        for code in &self.codes {
            if code.is_empty() {
                return Err(MatchError::ConfigValidation(
                    "schema.codes contains an empty code".into(),
                ));
            }
            if !seen.insert(code.as_str()) {
                return Err(MatchError::ConfigValidation(format!(
                    "schema.codes: duplicate code '{code}'"
                )));
            }
        }

        for code in &self.range_codes {
            if !seen.contains(code.as_str()) {
                return Err(MatchError::ConfigValidation(format!(
                    "schema.range_codes: '{code}' is not listed in schema.codes"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ColumnMap
// ---------------------------------------------------------------------------

/// Bidirectional code <-> daily record offset lookup. Immutable once built.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    codes: Vec<String>,
    offsets: HashMap<String, usize>,
    range: HashSet<String>,
    daily_first_column: usize,
}

/// One row of the column table, as listed by `zmatch columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo<'a> {
    pub code: &'a str,
    /// Offset within a daily record (0 = entity id).
    pub offset: usize,
    /// Column index within the raw daily row.
    pub daily_column: usize,
    pub range_comparable: bool,
}

impl ColumnMap {
    pub fn new(schema: &SchemaConfig) -> Result<Self, MatchError> {
        schema.validate()?;
        Ok(Self::from_parts(schema))
    }

    /// The standard 22-code table starting at raw daily column 41.
    pub fn standard() -> Self {
        Self::from_parts(&SchemaConfig::default())
    }

    fn from_parts(schema: &SchemaConfig) -> Self {
        let offsets = schema
            .codes
            .iter()
            .enumerate()
            .map(|(i, code)| (code.clone(), i + 1))
            .collect();

        Self {
            codes: schema.codes.clone(),
            offsets,
            range: schema.range_codes.iter().cloned().collect(),
            daily_first_column: schema.daily_first_column,
        }
    }

    /// Record offset of `code`, or `None` for codes outside the schema.
    pub fn offset(&self, code: &str) -> Option<usize> {
        self.offsets.get(code).copied()
    }

    pub fn is_range_comparable(&self, code: &str) -> bool {
        self.range.contains(code)
    }

    /// Reverse lookup. Offset 0 is the entity id and has no code.
    pub fn code_at(&self, offset: usize) -> Option<&str> {
        offset
            .checked_sub(1)
            .and_then(|i| self.codes.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Raw daily columns copied into a daily record after the id.
    pub fn daily_slice(&self) -> RangeInclusive<usize> {
        self.daily_first_column..=self.daily_first_column + self.codes.len() - 1
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnInfo<'_>> {
        self.codes.iter().enumerate().map(move |(i, code)| ColumnInfo {
            code: code.as_str(),
            offset: i + 1,
            daily_column: self.daily_first_column + i,
            range_comparable: self.range.contains(code),
        })
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_offsets_follow_enumeration() {
        let map = ColumnMap::standard();
        assert_eq!(map.len(), 22);
        assert_eq!(map.offset("AP"), Some(1));
        assert_eq!(map.offset("AQ"), Some(2));
        assert_eq!(map.offset("BK"), Some(22));
        assert_eq!(map.offset("ZZ"), None);
        assert_eq!(map.offset("Total"), None);
    }

    #[test]
    fn standard_range_set() {
        let map = ColumnMap::standard();
        let ranged: Vec<&str> = map
            .columns()
            .filter(|c| c.range_comparable)
            .map(|c| c.code)
            .collect();
        assert_eq!(ranged, STANDARD_RANGE_CODES.to_vec());
        assert!(map.is_range_comparable("AQ"));
        assert!(!map.is_range_comparable("AP"));
        assert!(!map.is_range_comparable("ZZ"));
    }

    #[test]
    fn code_at_is_inverse_of_offset() {
        let map = ColumnMap::standard();
        assert_eq!(map.code_at(0), None);
        assert_eq!(map.code_at(23), None);
        for info in map.columns() {
            assert_eq!(map.code_at(info.offset), Some(info.code));
        }
    }

    #[test]
    fn daily_slice_is_41_to_62() {
        let map = ColumnMap::standard();
        assert_eq!(map.daily_slice(), 41..=62);
        let first = map.columns().next().unwrap();
        assert_eq!(first.daily_column, 41);
    }

    #[test]
    fn synthetic_schema() {
        let schema = SchemaConfig {
            daily_first_column: 2,
            codes: vec!["X".into(), "Y".into()],
            range_codes: vec!["Y".into()],
        };
        let map = ColumnMap::new(&schema).unwrap();
        assert_eq!(map.offset("Y"), Some(2));
        assert_eq!(map.daily_slice(), 2..=3);
        assert!(map.is_range_comparable("Y"));
    }

    #[test]
    fn reject_duplicate_code() {
        let schema = SchemaConfig {
            codes: vec!["AP".into(), "AP".into()],
            range_codes: vec![],
            ..Default::default()
        };
        let err = ColumnMap::new(&schema).unwrap_err();
        assert!(err.to_string().contains("duplicate code 'AP'"));
    }

    #[test]
    fn reject_range_code_outside_schema() {
        let schema = SchemaConfig {
            codes: vec!["AP".into()],
            range_codes: vec!["AQ".into()],
            ..Default::default()
        };
        let err = ColumnMap::new(&schema).unwrap_err();
        assert!(err.to_string().contains("'AQ'"));
    }

    #[test]
    fn reject_empty_codes_and_zero_first_column() {
        let empty = SchemaConfig {
            codes: vec![],
            range_codes: vec![],
            ..Default::default()
        };
        assert!(ColumnMap::new(&empty).is_err());

        let zero = SchemaConfig {
            daily_first_column: 0,
            ..Default::default()
        };
        assert!(ColumnMap::new(&zero).is_err());
    }
}
