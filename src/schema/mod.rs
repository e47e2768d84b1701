//! Schema registry for rowbase
//!
//! A schema is a table name plus an ordered list of attribute names. The
//! `id` attribute is implicit in every schema and never listed explicitly.
//!
//! # Rules
//!
//! - Table names are unique process-wide
//! - Schemas are immutable once registered
//! - Re-defining an existing name is a no-op, not an error

mod registry;
mod types;

pub use registry::SchemaRegistry;
pub use types::{validate_table_name, Schema, ID_ATTRIBUTE};
