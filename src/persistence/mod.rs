//! Snapshot persistence for rowbase
//!
//! Snapshots are a best-effort flush of the in-memory database, written on
//! demand and read back once at startup. There is no write-ahead log.
//!
//! # Layout (under the data directory)
//!
//! - `tables.json` - ordered array of table names
//! - `<table>.json` - array of record objects, each including `id`
//! - `<table>.index` - the table's next id as a plain integer
//!
//! # Limitations
//!
//! Tables are captured one at a time under their own read lock, so writes
//! landing mid-save can produce a snapshot where tables reflect different
//! moments. A missing snapshot is an empty database; a malformed one is
//! fatal at startup.

mod errors;
mod snapshot;

pub use errors::{PersistenceError, PersistenceResult};
pub use snapshot::{SaveSummary, SnapshotStore};
