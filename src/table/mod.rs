//! Tables and records
//!
//! A table owns the live records of one schema in insertion order, plus an
//! identity counter that only ever grows. Record lifecycle is
//! absent -> live -> deleted; ids are never reused.

mod record;
mod table;

pub use record::{AttributeMap, Record};
pub use table::Table;
