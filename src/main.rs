use std::path::Path;
use std::process::ExitCode;

use adcheck::cli::{self, Cli, Command, RunArgs};
use adcheck::storage::{self, HistoryStore};
use adcheck::suite::Case;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Reports go to stdout, so logs stay on stderr.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();

    match cli.into_command() {
        Command::Run(args) => run(args).await,
        Command::List { extended } => {
            for case in Case::selection(extended) {
                println!("{case}");
            }
            ExitCode::SUCCESS
        }
        Command::History {
            limit,
            last_report,
            history_db,
        } => {
            let path = history_db.unwrap_or_else(storage::default_history_path);
            match show_history(&path, limit, last_report) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("{err}");
                    ExitCode::from(EXIT_USAGE)
                }
            }
        }
    }
}

fn show_history(path: &Path, limit: usize, last_report: bool) -> adcheck::Result<()> {
    let store = HistoryStore::open(path)?;

    if last_report {
        match store.last_report_json()? {
            Some(report) => println!("{report}"),
            None => println!("No runs recorded in {}", path.display()),
        }
        return Ok(());
    }

    let history = store.load(limit)?;
    if history.is_empty() {
        println!("No runs recorded in {}", path.display());
    }
    for entry in history.entries() {
        println!("{}", entry.summary_line());
    }
    Ok(())
}

async fn run(args: RunArgs) -> ExitCode {
    let report = match cli::run_suite(&args).await {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match cli::render(&report, args.format) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => error!("{err}"),
    }

    if let Some(path) = &args.report {
        match storage::write_report(path, &report) {
            Ok(()) => info!("Report written to {}", path.display()),
            Err(err) => warn!("{err}"),
        }
    }

    if !args.no_history {
        let path = args
            .history_db
            .clone()
            .unwrap_or_else(storage::default_history_path);
        if let Err(err) = HistoryStore::open(&path).and_then(|store| store.record(&report)) {
            warn!("{err}");
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}
