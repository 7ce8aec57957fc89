//! `zmatch run` configuration: file paths, output, worker count and the
//! embedded `[match]` table. Loaded from TOML, then overridden by flags.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use zmatcher_engine::{MatchConfig, MatchError};
use zmatcher_io::TableFormat;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub daily: Option<PathBuf>,
    /// Folder of historical tables.
    pub historical: Option<PathBuf>,
    /// `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Overrides `<daily-stem>_Matches.<ext>`.
    pub output: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Leading rows dropped from the daily table before matching.
    #[serde(default)]
    pub daily_header_rows: usize,
    /// Leading rows dropped from every historical table.
    #[serde(default)]
    pub historical_header_rows: usize,
    #[serde(default)]
    pub on_file_error: FileErrorPolicy,
    #[serde(default, rename = "match")]
    pub matching: MatchConfig,
}

fn default_delimiter() -> char {
    ','
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            daily: None,
            historical: None,
            workers: None,
            output_format: OutputFormat::default(),
            output: None,
            delimiter: default_delimiter(),
            daily_header_rows: 0,
            historical_header_rows: 0,
            on_file_error: FileErrorPolicy::default(),
            matching: MatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn table_format(self) -> TableFormat {
        match self {
            Self::Csv => TableFormat::Csv,
            Self::Xlsx => TableFormat::Xlsx,
        }
    }
}

/// What to do when one historical table cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug)]
pub enum RunConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(String),
    Invalid(String),
    Match(MatchError),
}

impl fmt::Display for RunConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "config validation error: {msg}"),
            Self::Match(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RunConfigError {}

impl From<MatchError> for RunConfigError {
    fn from(err: MatchError) -> Self {
        Self::Match(err)
    }
}

impl RunConfig {
    pub fn from_toml(input: &str) -> Result<Self, RunConfigError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| RunConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file. Relative `daily`, `historical` and
    /// `output` paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, RunConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| RunConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&input)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for slot in [&mut config.daily, &mut config.historical, &mut config.output] {
            if let Some(p) = slot.as_mut() {
                if p.is_relative() {
                    *p = base_dir.join(&*p);
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(RunConfigError::Invalid(format!(
                "delimiter '{}' must be a single ASCII character",
                self.delimiter
            )));
        }
        if self.workers == Some(0) {
            return Err(RunConfigError::Invalid("workers must be at least 1".into()));
        }
        self.matching.validate()?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    /// Explicit `output`, or `<daily-stem>_Matches.<ext>` next to the daily file.
    pub fn output_path(&self, daily: &Path) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => zmatcher_io::output_path(daily, self.output_format.table_format()),
        }
    }
}
