//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod mappings;
mod search;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "tmscout")]
#[command(about = "Military equipment nameplate OCR and technical manual search")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to $TMSCOUT_CONFIG or ./tmscout.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from settings, 0.0.0.0:3000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Search for a technical manual by TM number and/or model
    Search {
        /// TM number, e.g. 9-6115-642-10
        #[arg(long)]
        tm: Option<String>,

        /// Equipment model, e.g. MEP-803A
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// OCR a nameplate photo and print the model and TM number
    Extract {
        /// Image file to read
        image: PathBuf,

        /// Print the fields as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the model-to-TM mapping table
    Mappings,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Search {
            tm,
            model,
            limit,
            json,
        } => {
            search::cmd_search(&settings, tm.as_deref(), model.as_deref(), limit, json).await
        }
        Commands::Extract { image, json } => extract::cmd_extract(&settings, &image, json).await,
        Commands::Mappings => mappings::cmd_mappings().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::try_parse_from([
            "tmscout", "-v", "search", "--tm", "9-6115-642-10", "--limit", "3", "--json",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Search {
                tm, limit, json, model,
            } => {
                assert_eq!(tm.as_deref(), Some("9-6115-642-10"));
                assert_eq!(model, None);
                assert_eq!(limit, Some(3));
                assert!(json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["tmscout", "serve", "--config", "alt.toml", "--bind", "8080"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::Serve { bind: Some(ref b) } if b == "8080"));
    }

    #[test]
    fn test_extract_requires_image() {
        assert!(Cli::try_parse_from(["tmscout", "extract"]).is_err());
    }
}
