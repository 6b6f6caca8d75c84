//! jobnotify — binary entrypoint.
//! Parses the command line, sets up logging, and runs one notification pass.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobnotify::config::resolve_config_path;
use jobnotify::setup::{db_dir, default_app_dir, initial_setup};
use jobnotify::RunOutcome;

const LOG_FILE_NAME: &str = "jobnotify.log";

#[derive(Parser, Debug)]
#[command(name = "jobnotify")]
#[command(about = "Send notifications about new job listings.")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to a file in the app data directory
    #[arg(short, long)]
    verbose: bool,

    /// Create the app data directory and sample configuration, then exit
    #[arg(long)]
    setup: bool,
}

/// Verbose: debug-level log file. Otherwise `RUST_LOG` (default `warn`) to stderr.
fn init_tracing(verbose: bool, app_dir: &std::path::Path) -> Result<()> {
    if verbose {
        std::fs::create_dir_all(app_dir)
            .with_context(|| format!("creating {}", app_dir.display()))?;
        let path = app_dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("jobnotify=debug,warn"))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let app_dir = default_app_dir();

    if cli.setup {
        initial_setup(&app_dir).context("creating app data directory")?;
        println!("App data directory created: {}", app_dir.display());
        return Ok(());
    }

    init_tracing(cli.verbose, &app_dir)?;
    tracing::debug!(?cli, "arguments");

    if !db_dir(&app_dir).is_dir() {
        initial_setup(&app_dir).context("creating app data directory")?;
        tracing::info!(path = %app_dir.display(), "created app data directory");
    }

    let config_path = resolve_config_path(cli.config, &app_dir);
    match jobnotify::jobnotify(&config_path, &db_dir(&app_dir)).await? {
        RunOutcome::Idle => tracing::info!("no new listings"),
        RunOutcome::Notified { listings, channels } => {
            tracing::info!(listings, ?channels, "run complete")
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            tracing::error!(error = %format!("{e:#}"), "run failed");
            ExitCode::FAILURE
        }
    }
}
