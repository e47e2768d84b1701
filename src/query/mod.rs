//! Predicate query engine
//!
//! Evaluates a single `(attribute, operator, value, type)` predicate over a
//! full table scan. There are no indexes. Results keep insertion order;
//! the engine filters, it never sorts.

mod coercion;
mod filter;
mod predicate;

pub use coercion::{coerce, raw_text, Coerced};
pub use filter::PredicateFilter;
pub use predicate::{Operator, Predicate, ValueType};
