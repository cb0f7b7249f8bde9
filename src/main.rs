//! Emptrack CLI Entry Point
//!
//! Resolves the database connection from the environment, opens the
//! process-wide handle and runs the interactive menu until "Exit".
//!
//! Tables and prompts go to stdout. Logs go to stderr (`RUST_LOG`, default `warn`).

use std::process::ExitCode;

use anyhow::anyhow;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use emptrack::{acquire, load_dotenv, resolve_connection, App, TerminalPrompter};

/// Emptrack - Interactive employee, role and department tracker
///
/// Connection settings are read from DB_ENGINE, DB_HOST, DB_PORT, DB_USER,
/// DB_PASSWORD, DB_DATABASE (postgres) or DB_FILE (sqlite), and
/// DB_STATEMENT_TIMEOUT_MS. A .env file in the current directory is honoured.
#[derive(Parser)]
#[command(name = "emptrack")]
#[command(version)]
struct Cli {}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

async fn run() -> emptrack::Result<()> {
    for path in load_dotenv() {
        info!(path = %path.display(), "loaded .env");
    }

    let config = resolve_connection()?;
    let handle = acquire(&config).await?;

    let result = App::new(&handle, TerminalPrompter::default(), std::io::stdout()).run().await;

    handle.close().await;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();
    init_tracing().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = err.error_code(), "{err}");
            eprintln!("Error: {}", err.message());
            ExitCode::FAILURE
        }
    }
}
