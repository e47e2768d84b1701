//! Database facade
//!
//! `Database` is the call contract the request layer talks to. It owns the
//! schema registry and one `Table` per schema, and is passed explicitly by
//! handle; there is no process-global state.

mod engine;

pub use engine::{Database, SchemaInfo};
