//! Observable events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` key of a log line.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    BootStart,
    ConfigLoaded,
    Serving,
    ShutdownStart,
    ShutdownComplete,

    // Snapshot load
    SnapshotLoaded,
    TableRestored,
    /// Table listed in the registry but with no persisted records
    TableSkipped,
    /// Snapshot unreadable; startup aborts
    SnapshotCorrupt,

    // Schema
    SchemaDefined,
    DatabaseReset,

    // Records
    RecordInserted,
    RecordUpdated,
    RecordDeleted,

    // Queries
    QueryExecuted,
    QueryRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "ROWBASE_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "ROWBASE_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::TableRestored => "TABLE_RESTORED",
            Event::TableSkipped => "TABLE_SKIPPED",
            Event::SnapshotCorrupt => "SNAPSHOT_CORRUPT",

            Event::SchemaDefined => "SCHEMA_DEFINED",
            Event::DatabaseReset => "DATABASE_RESET",

            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDeleted => "RECORD_DELETED",

            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SnapshotCorrupt => Severity::Fatal,
            Event::TableSkipped | Event::QueryRejected => Severity::Warn,
            Event::RecordInserted
            | Event::RecordUpdated
            | Event::RecordDeleted
            | Event::QueryExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
