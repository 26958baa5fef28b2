//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod query;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "geosearch")]
#[command(about = "Proximity search over named geographic points")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Connect to PostgreSQL without TLS
    #[arg(long, global = true)]
    no_tls: bool,

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
        /// Address to bind to: port, host, or host:port
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print every entity, ordered by name
    List {
        /// Emit a GeoJSON FeatureCollection
        #[arg(short, long)]
        geojson: bool,
    },

    /// Print the entities within a radius of a named entity
    Nearby {
        /// Name of the reference entity
        entity: String,
        /// Search radius in meters
        #[arg(short, long)]
        range: i64,
        /// Emit a GeoJSON FeatureCollection (includes the reference entity)
        #[arg(short, long)]
        geojson: bool,
    },

    /// Verify the database is reachable
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let mut settings = load_settings(options).await?;
    if cli.no_tls {
        settings.no_tls = true;
    }

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::List { geojson } => query::cmd_list(&settings, geojson).await,
        Commands::Nearby {
            entity,
            range,
            geojson,
        } => query::cmd_nearby(&settings, &entity, range, geojson).await,
        Commands::Check => check::cmd_check(&settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nearby() {
        let cli = Cli::try_parse_from([
            "geosearch", "nearby", "Lapa", "--range", "500", "--geojson",
        ])
        .unwrap();
        match cli.command {
            Commands::Nearby {
                entity,
                range,
                geojson,
            } => {
                assert_eq!(entity, "Lapa");
                assert_eq!(range, 500);
                assert!(geojson);
            }
            _ => panic!("expected nearby"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["geosearch", "serve", "--bind", "9000", "--no-tls", "-v"]).unwrap();
        assert!(cli.no_tls);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { bind: Some(ref b) } if b == "9000"));
    }

    #[test]
    fn test_nearby_requires_range() {
        assert!(Cli::try_parse_from(["geosearch", "nearby", "Lapa"]).is_err());
    }
}
