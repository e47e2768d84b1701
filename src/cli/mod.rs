//! CLI module for rowbase
//!
//! Provides command-line interface for:
//! - start: Restore the snapshot and serve HTTP until ctrl-c
//! - schema: Print the persisted schemas without serving

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run, run_command, schema, start};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
