//! # Wardline Main Entry Point

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;
use wardline::cmd_args::CommandLineArgs;
use wardline::config;
use wardline::AppController;

/// Log to a file; the terminal is in raw mode while the grid runs
fn init_tracing_subscriber(verbose: bool) -> Result<()> {
    let log_path = PathBuf::from(shellexpand::tilde(&config::get_log_path()).into_owned());
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create log directory {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(config::LOG_LEVEL_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level))
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("hyper_util=warn".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::rfc_3339())
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd_args = CommandLineArgs::parse();
    init_tracing_subscriber(cmd_args.verbose())?;
    tracing::info!("wardline {} starting", env!("CARGO_PKG_VERSION"));

    let mut app = AppController::new(&cmd_args)?;
    app.run()
        .await
        .inspect_err(|e| tracing::error!("Session ended: {:#}", e))
}
