// zmatch - match a daily table against a folder of historical tables

mod exit_codes;
mod inspect;
mod logging;
mod run;
mod run_config;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;
use logging::{init_logging, LogConfig};
use run::RunArgs;

#[derive(Parser)]
#[command(name = "zmatch")]
#[command(about = "Match a daily table against a folder of historical tables")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only; no progress or summary
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run matching and write the matched rows
    #[command(after_help = "\
Exit code 3 means the run finished with zero matches; no file is written.

Examples:
  zmatch run daily.csv history/
  zmatch run daily.csv history/ --format xlsx --workers 8
  zmatch run daily.xlsx history/ --policy count -o wins.csv
  zmatch run --config run.toml --json
  zmatch run daily.csv history/ --skip-failed-files --any-id")]
    Run(RunArgs),

    /// Validate a run config without running
    #[command(after_help = "\
Examples:
  zmatch validate run.toml")]
    Validate {
        /// Path to the run config (TOML)
        config: PathBuf,
    },

    /// List the column codes and where they sit in the daily row
    #[command(after_help = "\
Examples:
  zmatch columns
  zmatch columns --config run.toml --json")]
    Columns {
        /// Run config whose [match.schema] to list (default: standard table)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(
        &LogConfig::from_flags(cli.verbose, cli.quiet).with_ansi(std::io::stderr().is_terminal()),
    );

    let result = match cli.command {
        Commands::Run(args) => run::cmd_run(args, cli.quiet),
        Commands::Validate { config } => inspect::cmd_validate(config),
        Commands::Columns { config, json } => inspect::cmd_columns(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
