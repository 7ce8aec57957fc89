use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate code, bad range set, etc.).
    ConfigValidation(String),
    /// The worker pool could not be started.
    WorkerPool(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::WorkerPool(msg) => write!(f, "cannot start worker pool: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}

/// Per-row parse failure. Never escapes a worker: the row simply
/// contributes no match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowParseError {
    /// Row has fewer cells than the layout requires.
    TooShort { len: usize, required: usize },
    /// Expected-count field is not an integer.
    BadCount(String),
}

impl fmt::Display for RowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len, required } => {
                write!(f, "row has {len} cell(s), at least {required} required")
            }
            Self::BadCount(value) => write!(f, "cannot parse count '{value}'"),
        }
    }
}

impl std::error::Error for RowParseError {}
