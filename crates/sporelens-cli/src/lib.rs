//! # sporelens-cli
//!
//! Command-line front end for Sporelens:
//! - `search`: rank a document collection against a query
//! - `classify`: show presentation categories for a record's fields
//! - `extract`: pull a field out of a record across perspectives
//! - `replay`: drive the search service from a JSON-lines event file
//! - `config`: locate, show, and initialize the configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod error;

pub use error::{Error, Result};

use std::io::Write;

use cli::{Cli, Command};
use commands::SearchArgs;
use sporelens_core::SporelensConfig;

/// Execute a parsed command line, writing output to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Config { action } => {
            config_handlers::handle_config_command(config_path, action, out)
        }
        Command::Search {
            docs,
            query,
            min_score,
            show_dimmed,
            json,
        } => {
            let config = SporelensConfig::load(config_path)?;
            let args = SearchArgs {
                min_score,
                show_dimmed,
                json,
            };
            commands::cmd_search(&config, &docs, &query, &args, out)
        }
        Command::Classify { docs, id, path } => {
            commands::cmd_classify(&docs, &id, path.as_deref(), out)
        }
        Command::Extract {
            docs,
            id,
            path,
            perspectives,
            deep,
        } => {
            let config = SporelensConfig::load(config_path)?;
            commands::cmd_extract(&config, &docs, &id, path.as_deref(), &perspectives, deep, out)
        }
        Command::Replay { docs, events } => {
            let config = SporelensConfig::load(config_path)?;
            commands::cmd_replay(&config, &docs, &events, out).await
        }
    }
}
