//! CLI command implementations
//!
//! `start` boots in a fixed order:
//! 1. Configuration load
//! 2. Snapshot restore
//! 3. HTTP serving until ctrl-c
//! 4. Optional persist on shutdown

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use crate::database::Database;
use crate::http_server::{shutdown_signal, HttpServer};
use crate::observability::{log_event, log_event_with_fields, Event, Logger, Severity};
use crate::persistence::SnapshotStore;

/// Main CLI entry point; the only function main.rs calls
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config, port } => start(&config, port),
        Command::Schema { config } => schema(&config),
    }
}

/// Restore the snapshot and serve until ctrl-c
pub fn start(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }
    Logger::set_min_severity(config.severity()?);

    log_event(Event::BootStart);
    let config_display = config_path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", config_display.as_str()),
            ("data_dir", config.data_dir.as_str()),
        ],
    );

    let db = Arc::new(Database::open(config.data_path())?);
    let server = HttpServer::new(config.http.clone(), Arc::clone(&db));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start(shutdown_signal())
            .await
            .map_err(|e| CliError::io_error(format!("HTTP server failed: {}", e)))
    })?;

    if config.persist_on_shutdown {
        db.persist_all()
            .map_err(|e| CliError::persist_failed(format!("{} ({})", e, e.code())))?;
    }

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Print `{table: [attributes]}` for every table in the snapshot
pub fn schema(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    // Keep stdout to the listing itself
    Logger::set_min_severity(Severity::Warn.max(config.severity()?));

    let tables = SnapshotStore::new(config.data_path())
        .load()
        .map_err(|e| CliError::boot_failed(format!("{} ({})", e, e.code())))?;

    let listing: Map<String, Value> = tables
        .iter()
        .map(|table| (table.name().to_string(), Value::from(table.schema().columns())))
        .collect();

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &Value::Object(listing))?;
    writeln!(stdout)?;
    Ok(())
}
