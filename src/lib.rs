//! rowbase - a dynamically-schematized in-memory record store
//!
//! Tables are declared at runtime as a name plus a list of attribute
//! names. Records get auto-increment ids, can be filtered by a single
//! typed predicate, and are flushed to a JSON snapshot on demand.

pub mod cli;
pub mod database;
pub mod errors;
pub mod http_server;
pub mod observability;
pub mod persistence;
pub mod query;
pub mod schema;
pub mod table;

pub use database::{Database, SchemaInfo};
pub use errors::{DbError, DbResult};
