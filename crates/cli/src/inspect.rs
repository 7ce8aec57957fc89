//! `zmatch validate` and `zmatch columns`: check a run config, list the
//! column table without running anything.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zmatcher_engine::schema::ColumnInfo;
use zmatcher_engine::ColumnMap;

use crate::exit_codes::{match_exit_code, EXIT_CONFIG, EXIT_ERROR};
use crate::run_config::RunConfig;
use crate::CliError;

fn config_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_CONFIG, message: msg.into(), hint: None }
}

fn load_config(path: Option<&Path>) -> Result<RunConfig, CliError> {
    match path {
        Some(path) => RunConfig::load(path).map_err(|e| config_err(e.to_string())),
        None => Ok(RunConfig::default()),
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    let columns = ColumnMap::new(&config.matching.schema)
        .map_err(|e| CliError { code: match_exit_code(&e), message: e.to_string(), hint: None })?;

    let range = columns.columns().filter(|c| c.range_comparable).count();
    let slice = columns.daily_slice();
    eprintln!(
        "valid: {} policy, {} code(s) ({} range), daily columns {}..={}",
        config.matching.policy.kind,
        columns.len(),
        range,
        slice.start(),
        slice.end(),
    );

    for (label, path) in [("daily", &config.daily), ("historical", &config.historical)] {
        match path {
            Some(p) => eprintln!("  {label}: {}", p.display()),
            None => eprintln!("  {label}: (not set, pass on the command line)"),
        }
    }

    Ok(())
}

pub fn cmd_columns(config_path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let columns = ColumnMap::new(&config.matching.schema)
        .map_err(|e| CliError { code: match_exit_code(&e), message: e.to_string(), hint: None })?;
    let infos: Vec<ColumnInfo<'_>> = columns.columns().collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let io_err = |e: io::Error| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None };

    if json {
        let json_str = serde_json::to_string_pretty(&infos)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        writeln!(out, "{json_str}").map_err(io_err)?;
        return Ok(());
    }

    writeln!(out, "{:<6}{:>8}{:>8}  {}", "code", "offset", "column", "compare").map_err(io_err)?;
    for info in &infos {
        writeln!(
            out,
            "{:<6}{:>8}{:>8}  {}",
            info.code,
            info.offset,
            info.daily_column,
            if info.range_comparable { "range" } else { "exact" }
        )
        .map_err(io_err)?;
    }

    Ok(())
}
