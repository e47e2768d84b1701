//! Predicate filtering over a table scan
//!
//! The comparison value is coerced once before the scan; each stored value
//! is coerced the same way as it is visited. A null or missing attribute is
//! "absent": it never equals anything, so `not` keeps it and every other
//! operator drops it. `like` always works on the raw text of both sides.

use serde_json::Value;

use super::coercion::{coerce, Coerced};
use super::predicate::{Operator, Predicate, ValueType};
use crate::errors::{DbError, DbResult};
use crate::table::{Record, Table};

/// Evaluates one predicate against a table
pub struct PredicateFilter;

impl PredicateFilter {
    /// Scans `table` and returns matching records in insertion order
    pub fn execute(table: &Table, predicate: &Predicate) -> DbResult<Vec<Record>> {
        if !table.schema().contains(&predicate.attribute) {
            return Err(DbError::unknown_attribute(
                table.name(),
                predicate.attribute.clone(),
            ));
        }
        Self::apply(table.scan(), predicate)
    }

    /// Filters already-scanned records
    pub fn apply(records: Vec<Record>, predicate: &Predicate) -> DbResult<Vec<Record>> {
        let value_type = effective_type(predicate);
        let target = coerce(&predicate.value, value_type)?;

        let mut kept = Vec::new();
        for record in records {
            if Self::matches(&record, predicate, value_type, &target)? {
                kept.push(record);
            }
        }
        Ok(kept)
    }

    fn matches(
        record: &Record,
        predicate: &Predicate,
        value_type: ValueType,
        target: &Coerced,
    ) -> DbResult<bool> {
        let actual = match present(record, &predicate.attribute) {
            Some(value) => coerce(&value, value_type)?,
            None => return Ok(predicate.op == Operator::Not),
        };

        Ok(match predicate.op {
            Operator::Is => actual == *target,
            Operator::Not => actual != *target,
            Operator::Gt => actual > *target,
            Operator::Lt => actual < *target,
            Operator::Like => match (&actual, target) {
                (Coerced::Text(haystack), Coerced::Text(needle)) => {
                    haystack.contains(needle.as_str())
                }
                _ => false,
            },
        })
    }
}

/// `like` always compares raw text, whatever type was declared
fn effective_type(predicate: &Predicate) -> ValueType {
    match predicate.op {
        Operator::Like => ValueType::String,
        _ => predicate.value_type,
    }
}

/// Attribute value, treating null as absent
fn present(record: &Record, attribute: &str) -> Option<Value> {
    record
        .value(attribute)
        .map(|value| value.into_owned())
        .filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ValueType;
    use crate::schema::Schema;
    use serde_json::json;
    use std::sync::Arc;

    fn users() -> Table {
        let table = Table::new(Arc::new(
            Schema::new("User", ["name", "email", "age", "created_at"]).unwrap(),
        ));
        table
            .insert(json!({"name": "Jesse James", "age": 31, "created_at": "10-10-1869"}))
            .unwrap();
        table
            .insert(json!({"name": "John Doe", "age": "25", "created_at": "12-1-1969"}))
            .unwrap();
        table
            .insert(json!({"name": "Jane Smith", "age": 18, "created_at": "17-10-1999"}))
            .unwrap();
        table.insert(json!({"name": "Nobody"})).unwrap();
        table
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn test_is_exact() {
        let result = PredicateFilter::execute(&users(), &Predicate::is("name", "John Doe")).unwrap();
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn test_not_keeps_absent() {
        let pred = Predicate::new("age", Operator::Not, "25", ValueType::Integer);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert_eq!(ids(&result), vec![1, 3, 4]);
    }

    #[test]
    fn test_integer_lt_mixes_text_and_numbers() {
        let pred = Predicate::new("age", Operator::Lt, "30", ValueType::Integer);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert_eq!(ids(&result), vec![2, 3]);
    }

    #[test]
    fn test_string_comparison_is_lexicographic() {
        // "4" > "31" and "4" > "25" and "4" > "18" lexicographically
        let pred = Predicate::new("age", Operator::Gt, "4", ValueType::String);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert!(result.is_empty());

        let pred = Predicate::new("age", Operator::Gt, "4", ValueType::Integer);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_time_comparison() {
        let pred = Predicate::new("created_at", Operator::Gt, "1-Jan-1950", ValueType::Time);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert_eq!(ids(&result), vec![2, 3]);
    }

    #[test]
    fn test_like_substring() {
        let result = PredicateFilter::execute(&users(), &Predicate::like("name", "Ja")).unwrap();
        assert_eq!(ids(&result), vec![1, 3]);
    }

    #[test]
    fn test_like_ignores_declared_type() {
        let pred = Predicate::like("age", "1").typed(ValueType::Time);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert_eq!(ids(&result), vec![1, 3]);
    }

    #[test]
    fn test_bad_comparison_value_fails() {
        let pred = Predicate::new("age", Operator::Gt, "old", ValueType::Integer);
        assert!(matches!(
            PredicateFilter::execute(&users(), &pred),
            Err(DbError::TypeCoercion { .. })
        ));
    }

    #[test]
    fn test_bad_stored_value_fails() {
        let pred = Predicate::new("name", Operator::Lt, "5", ValueType::Integer);
        assert!(matches!(
            PredicateFilter::execute(&users(), &pred),
            Err(DbError::TypeCoercion { .. })
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        assert!(matches!(
            PredicateFilter::execute(&users(), &Predicate::is("nickname", "x")),
            Err(DbError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_id_is_queryable() {
        let pred = Predicate::new("id", Operator::Gt, 2, ValueType::Integer);
        let result = PredicateFilter::execute(&users(), &pred).unwrap();
        assert_eq!(ids(&result), vec![3, 4]);
    }
}
