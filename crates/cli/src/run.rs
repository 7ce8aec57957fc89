//! `zmatch run`: match one daily table against every table in a folder.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::Args;
use serde::Serialize;
use zmatcher_engine::{FileReport, MatchEngine, PolicyKind, RunObserver, RunOutcome, Table};
use zmatcher_io::{TableError, TableFormat};

use crate::exit_codes::{
    match_exit_code, table_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_NO_MATCHES, EXIT_UNSUPPORTED_FORMAT,
    EXIT_USAGE,
};
use crate::run_config::{FileErrorPolicy, OutputFormat, RunConfig};
use crate::CliError;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Daily table (csv, xlsx, xls)
    pub daily: Option<PathBuf>,

    /// Folder of historical tables
    pub historical: Option<PathBuf>,

    /// Run config (TOML). Flags override its values.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Worker threads per historical table (default: available cores)
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Match policy: column | count
    #[arg(long)]
    pub policy: Option<PolicyKind>,

    /// Output format when --output is not given
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (default: <daily-stem>_Matches.<format> next to the daily file)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the run report as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Skip historical files that fail to load instead of aborting
    #[arg(long)]
    pub skip_failed_files: bool,

    /// Column policy: compare every daily row with every historical row, ignoring ids
    #[arg(long)]
    pub any_id: bool,

    /// Column policy: a pair with no comparable column does not match
    #[arg(long)]
    pub strict_columns: bool,

    /// CSV delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Leading daily rows to ignore
    #[arg(long)]
    pub daily_header_rows: Option<usize>,

    /// Leading rows to ignore in every historical table
    #[arg(long)]
    pub historical_header_rows: Option<usize>,
}

impl RunArgs {
    /// Layer flags over a loaded (or default) config.
    pub fn apply_to(&self, config: &mut RunConfig) {
        if let Some(ref daily) = self.daily {
            config.daily = Some(daily.clone());
        }
        if let Some(ref historical) = self.historical {
            config.historical = Some(historical.clone());
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
        if let Some(kind) = self.policy {
            config.matching.policy.kind = kind;
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(ref output) = self.output {
            config.output = Some(output.clone());
        }
        if self.skip_failed_files {
            config.on_file_error = FileErrorPolicy::Skip;
        }
        if self.any_id {
            config.matching.policy.require_same_id = false;
        }
        if self.strict_columns {
            config.matching.policy.require_comparable_column = true;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(n) = self.daily_header_rows {
            config.daily_header_rows = n;
        }
        if let Some(n) = self.historical_header_rows {
            config.historical_header_rows = n;
        }
    }
}

/// A historical file left out under `on_file_error = "skip"`.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    outcome: &'a RunOutcome,
    output: Option<&'a Path>,
    skipped: &'a [SkippedFile],
    duration_ms: u64,
}

/// Per-file progress lines on stderr, in the order files finish.
struct ProgressObserver {
    total: usize,
    done: AtomicUsize,
    enabled: bool,
}

impl RunObserver for ProgressObserver {
    fn file_started(&self, name: &str, rows: usize) {
        tracing::info!(file = name, rows, "processing");
    }

    fn file_finished(&self, report: &FileReport) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.enabled {
            eprintln!(
                "  [{done}/{}] {}: {} row(s), {} match(es)",
                self.total, report.name, report.historical_rows, report.matches
            );
        }
    }
}

fn run_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn table_err(err: TableError) -> CliError {
    run_err(table_exit_code(&err), err.to_string())
}

fn drop_header_rows(table: &mut Table, n: usize) {
    table.drain(..n.min(table.len()));
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn cmd_run(args: RunArgs, quiet: bool) -> Result<(), CliError> {
    let start = Instant::now();

    let mut config = match args.config {
        Some(ref path) => RunConfig::load(path).map_err(|e| run_err(EXIT_CONFIG, e.to_string()))?,
        None => RunConfig::default(),
    };
    args.apply_to(&mut config);
    config
        .validate()
        .map_err(|e| run_err(EXIT_CONFIG, e.to_string()))?;

    // Inputs are checked before any table is loaded
    let daily_path = config.daily.clone().ok_or_else(|| {
        run_err(EXIT_USAGE, "no daily file given")
            .with_hint("pass DAILY or set `daily` in the --config file")
    })?;
    let historical_dir = config.historical.clone().ok_or_else(|| {
        run_err(EXIT_USAGE, "no historical folder given")
            .with_hint("pass HISTORICAL_DIR or set `historical` in the --config file")
    })?;

    if !daily_path.is_file() {
        return Err(run_err(
            EXIT_CONFIG,
            format!("daily file not found: {}", daily_path.display()),
        ));
    }
    if !historical_dir.is_dir() {
        return Err(run_err(
            EXIT_CONFIG,
            format!("historical folder not found: {}", historical_dir.display()),
        ));
    }
    if TableFormat::from_path(&daily_path).is_none() {
        return Err(run_err(
            EXIT_UNSUPPORTED_FORMAT,
            format!("unsupported daily file type: {}", daily_path.display()),
        )
        .with_hint("supported: .csv, .xlsx, .xls"));
    }

    let output_path = config.output_path(&daily_path);
    if !TableFormat::from_path(&output_path).is_some_and(TableFormat::is_writable) {
        return Err(run_err(
            EXIT_UNSUPPORTED_FORMAT,
            format!("cannot write output as {}", output_path.display()),
        )
        .with_hint("output must end in .csv or .xlsx"));
    }

    let engine = MatchEngine::new(&config.matching, config.workers)
        .map_err(|e| run_err(match_exit_code(&e), e.to_string()))?;

    let delimiter = config.delimiter_byte();
    let mut daily = zmatcher_io::read_table(&daily_path, delimiter).map_err(table_err)?;
    drop_header_rows(&mut daily, config.daily_header_rows);

    let files = zmatcher_io::historical_files(&historical_dir).map_err(table_err)?;
    if files.is_empty() {
        tracing::warn!(folder = %historical_dir.display(), "no historical tables found");
    }

    let observer = ProgressObserver {
        total: files.len(),
        done: AtomicUsize::new(0),
        enabled: !quiet && !args.json,
    };

    let mut skipped: Vec<SkippedFile> = Vec::new();
    let mut run = engine.begin(&daily, &observer);

    for path in &files {
        let name = file_name(path);
        let mut table = match zmatcher_io::read_table(path, delimiter) {
            Ok(table) => table,
            Err(e) if config.on_file_error == FileErrorPolicy::Skip => {
                tracing::warn!(file = %name, error = %e, "skipping historical file");
                skipped.push(SkippedFile { name, error: e.to_string() });
                continue;
            }
            Err(e) => {
                return Err(table_err(e).with_hint("pass --skip-failed-files to continue past unreadable files"));
            }
        };
        drop_header_rows(&mut table, config.historical_header_rows);
        run.process(&name, &table);
    }

    let outcome = run.finish();

    let written = if outcome.has_matches() {
        zmatcher_io::write_table(&outcome.rows, &output_path, delimiter).map_err(table_err)?;
        Some(output_path.as_path())
    } else {
        None
    };

    let duration_ms = start.elapsed().as_millis() as u64;

    if args.json {
        let report = RunReport {
            outcome: &outcome,
            output: written,
            skipped: &skipped,
            duration_ms,
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| run_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    if !quiet {
        let s = &outcome.summary;
        eprintln!(
            "{} policy: {} file(s), {} historical row(s), {} daily row(s) -> {} match(es) ({}ms)",
            outcome.meta.policy.kind,
            s.files_processed,
            s.historical_rows,
            outcome.meta.daily_rows,
            s.matches,
            duration_ms,
        );
        if !skipped.is_empty() {
            eprintln!("skipped {} file(s) that failed to load", skipped.len());
        }
        if let Some(path) = written {
            eprintln!("wrote {}", path.display());
        }
    }

    if !outcome.has_matches() {
        return Err(run_err(EXIT_NO_MATCHES, "no matches found"));
    }

    Ok(())
}
