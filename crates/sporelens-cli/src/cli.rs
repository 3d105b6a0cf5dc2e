//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sporelens - search and inspect fungus records
#[derive(Parser, Debug)]
#[command(name = "sporelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging for sporelens crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank documents against a query
    Search {
        /// JSON document collection
        docs: PathBuf,

        /// Query text
        query: String,

        /// Show only documents scoring strictly above this
        #[arg(long, value_parser = parse_min_score)]
        min_score: Option<f64>,

        /// List non-matching documents as dimmed instead of hiding them
        #[arg(long)]
        show_dimmed: bool,

        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show presentation categories for a document's fields
    Classify {
        /// JSON document collection
        docs: PathBuf,

        /// Document identifier
        id: String,

        /// Field path to classify instead of the whole document
        #[arg(long)]
        path: Option<String>,
    },

    /// Extract a field across perspectives
    Extract {
        /// JSON document collection
        docs: PathBuf,

        /// Document identifier
        id: String,

        /// Field path to extract
        #[arg(long)]
        path: Option<String>,

        /// Active perspective (repeatable; none means all)
        #[arg(short = 'p', long = "perspective")]
        perspectives: Vec<String>,

        /// Return whole perspective sub-trees when no path is given
        #[arg(long)]
        deep: bool,
    },

    /// Feed a JSON-lines event file through the search service
    Replay {
        /// JSON document collection
        docs: PathBuf,

        /// One input event per line
        events: PathBuf,
    },

    /// Configuration management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Target file (defaults to the resolved config path)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Accept only finite, non-negative score thresholds.
fn parse_min_score(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("must be a non-negative number, got {raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "sporelens",
            "search",
            "fungi.json",
            "wood",
            "--min-score",
            "2.5",
            "--show-dimmed",
        ])
        .unwrap();
        match cli.command {
            Command::Search {
                query,
                min_score,
                show_dimmed,
                json,
                ..
            } => {
                assert_eq!(query, "wood");
                assert_eq!(min_score, Some(2.5));
                assert!(show_dimmed);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_min_score_rejects_negative_and_non_finite() {
        for bad in ["--min-score=-1", "--min-score=NaN", "--min-score=inf"] {
            let err = Cli::try_parse_from(["sporelens", "search", "fungi.json", "wood", bad])
                .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
        }

        let cli = Cli::try_parse_from([
            "sporelens",
            "search",
            "fungi.json",
            "wood",
            "--min-score",
            "0",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Search {
                min_score: Some(0.0),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_extract_with_perspectives() {
        let cli = Cli::try_parse_from([
            "sporelens",
            "extract",
            "fungi.json",
            "fly-agaric",
            "--path",
            "genus",
            "-p",
            "taxonomy",
            "-p",
            "chemistry",
        ])
        .unwrap();
        match cli.command {
            Command::Extract {
                path, perspectives, deep, ..
            } => {
                assert_eq!(path.as_deref(), Some("genus"));
                assert_eq!(perspectives, vec!["taxonomy", "chemistry"]);
                assert!(!deep);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli =
            Cli::try_parse_from(["sporelens", "--verbose", "config", "init", "--force"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init { force: true, .. }
            }
        ));
    }
}
