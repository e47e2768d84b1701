//! CLI argument definitions using clap
//!
//! Commands:
//! - rowbase start [--config <path>] [--port <n>]
//! - rowbase schema [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowbase - a dynamically-schematized record store served over HTTP
#[derive(Parser, Debug)]
#[command(name = "rowbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Restore the snapshot and start the HTTP server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./rowbase.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the schemas persisted in the data directory
    Schema {
        /// Path to configuration file
        #[arg(long, default_value = "./rowbase.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_port() {
        let cli = Cli::try_parse_from(["rowbase", "start", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Start { config, port } => {
                assert_eq!(config, PathBuf::from("./rowbase.json"));
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_schema() {
        let cli = Cli::try_parse_from(["rowbase", "schema", "--config", "/etc/rowbase.json"]).unwrap();
        assert!(matches!(cli.command, Command::Schema { .. }));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["rowbase", "query"]).is_err());
    }
}
