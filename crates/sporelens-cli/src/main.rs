//! Sporelens CLI
//!
//! Command-line interface for searching and inspecting fungus records.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use sporelens_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str =
    "info,sporelens_core=debug,sporelens_content=debug,sporelens_fts=debug,sporelens_cli=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { VERBOSE_FILTER } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?cli.command, "starting");

    let mut stdout = std::io::stdout().lock();
    sporelens_cli::run(cli, &mut stdout).await?;
    Ok(())
}
