use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::schema::SchemaConfig;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub kind: PolicyKind,
    /// Column policy only: compare records with equal entity ids only.
    /// The count policy always requires equal ids.
    #[serde(default = "default_true")]
    pub require_same_id: bool,
    /// Column policy only: reject pairs where every column was skipped
    /// instead of treating them as a match.
    #[serde(default)]
    pub require_comparable_column: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::default(),
            require_same_id: true,
            require_comparable_column: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Exact/range comparison over `code,value` pairs.
    #[default]
    Column,
    /// Sum of daily values over a code string equals an expected count.
    Count,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Column => write!(f, "column"),
            Self::Count => write!(f, "count"),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "column" => Ok(Self::Column),
            "count" => Ok(Self::Count),
            other => Err(MatchError::ConfigValidation(format!(
                "unknown policy \"{other}\" (expected \"column\" or \"count\")"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        self.schema.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
