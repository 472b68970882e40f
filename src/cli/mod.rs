//! # CLI Support
//!
//! Command-line interface for running the suite in CI pipelines: exit codes,
//! text or JSON reports, and an optional report file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::ads::AdsApi;
use crate::environment::{FileConfig, Overrides, Settings};
use crate::error::Result;
use crate::testing::{RunOptions, RunReport, Runner};

#[derive(Parser, Debug)]
#[command(
    name = "adcheck",
    version,
    about = "Contract checks for the advertisement HTTP API",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    /// The subcommand to execute; a bare invocation means `run`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the suite against the configured service.
    Run(RunArgs),
    /// Print the case names that a run would execute.
    List {
        /// Include cases outside the default set.
        #[arg(long)]
        extended: bool,
    },
    /// Print recent runs recorded in the history database.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Print the full JSON report of the most recent run instead.
        #[arg(long)]
        last_report: bool,

        /// Path to the history database. Defaults to `.adcheck/history.db`.
        #[arg(long, env = "ADCHECK_HISTORY_DB")]
        history_db: Option<PathBuf>,
    },
}

/// Where the service lives and which seller the suite writes under.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Base URL of the advertisement service.
    #[arg(long, env = "ADCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Seller id used for every created advertisement.
    #[arg(long, env = "ADCHECK_SELLER_ID")]
    pub seller_id: Option<i64>,

    /// Per-request timeout. The HTTP client default applies when unset.
    #[arg(long, env = "ADCHECK_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Optional TOML file with `base_url`, `seller_id` and `timeout_secs`.
    #[arg(long, env = "ADCHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

impl TargetArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            seller_id: self.seller_id,
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        let file_config = match &self.config {
            Some(path) => Some(FileConfig::load(path)?),
            None => None,
        };
        Settings::resolve(file_config, &self.overrides())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Also run cases outside the default set.
    #[arg(long)]
    pub extended: bool,

    /// Only run the named cases (repeatable or comma separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the JSON report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Do not record this run in the history database.
    #[arg(long)]
    pub no_history: bool,

    /// Path to the history database. Defaults to `.adcheck/history.db`.
    #[arg(long, env = "ADCHECK_HISTORY_DB")]
    pub history_db: Option<PathBuf>,
}

impl RunArgs {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            extended: self.extended,
            only: self.only.clone(),
        }
    }
}

/// Output format for CLI reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Resolve settings, select cases and run them.
pub async fn run_suite(args: &RunArgs) -> Result<RunReport> {
    let settings = args.target.settings()?;
    let cases = args.options().select()?;
    let api = AdsApi::from_settings(&settings)?;
    Ok(Runner::new(api).run(&cases).await)
}

pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => report.to_json(),
    }
}
