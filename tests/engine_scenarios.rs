//! Engine Scenario Tests
//!
//! End-to-end behavior of the `Database` call contract:
//! - define, insert, get, update, delete on one table
//! - partial updates and id immutability
//! - type-driven predicate coercion and substring matching

use rowbase::query::{Operator, Predicate, ValueType};
use rowbase::table::AttributeMap;
use rowbase::{Database, DbError};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn user_db() -> Database {
    let db = Database::in_memory();
    db.define_schema("User", ["name", "email", "age"], false)
        .unwrap();
    db
}

fn names(rows: &[AttributeMap]) -> Vec<String> {
    rows.iter()
        .map(|row| row["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Record Lifecycle
// =============================================================================

/// Insert, read back, rename, delete, then the id no longer resolves.
#[test]
fn test_record_lifecycle() {
    let db = Database::in_memory();
    db.define_schema("User", ["name", "email"], false).unwrap();

    let id = db
        .insert("User", json!({"name": "Jesse", "email": "jesse@x.com"}))
        .unwrap();
    assert_eq!(id, 1);

    let row = db.get("User", 1).unwrap();
    assert_eq!(
        Value::Object(row),
        json!({"id": 1, "name": "Jesse", "email": "jesse@x.com"})
    );

    assert_eq!(db.update("User", 1, json!({"name": "Jolly"})).unwrap(), 1);
    let row = db.get("User", 1).unwrap();
    assert_eq!(
        Value::Object(row),
        json!({"id": 1, "name": "Jolly", "email": "jesse@x.com"})
    );

    db.delete("User", 1).unwrap();
    assert!(matches!(
        db.get("User", 1),
        Err(DbError::NotFound { id: 1, .. })
    ));
}

/// Returned maps list `id` first, then attributes in definition order.
#[test]
fn test_attribute_order_follows_schema() {
    let db = Database::in_memory();
    db.define_schema("User", ["name", "email"], false).unwrap();
    db.insert("User", json!({"email": "jesse@x.com", "name": "Jesse"}))
        .unwrap();

    let keys: Vec<String> = db.get("User", 1).unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["id", "name", "email"]);

    let rows = db.query("User", &Predicate::is("name", "Jesse")).unwrap();
    let keys: Vec<String> = rows[0].keys().cloned().collect();
    assert_eq!(keys, vec!["id", "name", "email"]);
}

/// Deleting an id that was never assigned succeeds.
#[test]
fn test_delete_missing_is_noop() {
    let db = user_db();
    db.delete("User", 42).unwrap();
    db.delete("User", 42).unwrap();
}

/// Unmentioned attributes survive an update and `id` cannot be overwritten.
#[test]
fn test_partial_update_keeps_id() {
    let db = user_db();
    db.insert("User", json!({"name": "Ann", "email": "ann@x.com", "age": 31}))
        .unwrap();

    let id = db.update("User", 1, json!({"id": 99, "age": 32})).unwrap();
    assert_eq!(id, 1);

    let row = db.get("User", 1).unwrap();
    assert_eq!(row["id"], 1);
    assert_eq!(row["name"], "Ann");
    assert_eq!(row["email"], "ann@x.com");
    assert_eq!(row["age"], 32);
    assert!(matches!(db.get("User", 99), Err(DbError::NotFound { .. })));
}

#[test]
fn test_update_to_null_clears() {
    let db = user_db();
    db.insert("User", json!({"name": "Ann", "email": "ann@x.com"}))
        .unwrap();
    db.update("User", 1, json!({"email": null})).unwrap();

    let row = db.get("User", 1).unwrap();
    assert!(!row.contains_key("email"));
}

#[test]
fn test_update_missing_record() {
    let db = user_db();
    assert!(matches!(
        db.update("User", 7, json!({"name": "x"})),
        Err(DbError::NotFound { id: 7, .. })
    ));
}

#[test]
fn test_payload_errors() {
    let db = user_db();
    assert!(matches!(
        db.insert("User", json!({"nickname": "J"})),
        Err(DbError::UnknownAttribute { .. })
    ));
    assert!(matches!(
        db.insert("User", json!(["Jesse"])),
        Err(DbError::InvalidPayload(_))
    ));
    assert!(matches!(
        db.insert("Nobody", json!({"name": "J"})),
        Err(DbError::UnknownTable(_))
    ));
    // Rejected inserts do not consume ids
    assert_eq!(db.insert("User", json!({"name": "J"})).unwrap(), 1);
}

// =============================================================================
// Queries
// =============================================================================

/// The declared type decides how "50" compares against 40.
#[test]
fn test_coercion_is_type_driven() {
    let db = user_db();
    db.insert("User", json!({"name": "Old", "age": "50"})).unwrap();
    db.insert("User", json!({"name": "Teen", "age": "9"})).unwrap();

    let as_int = Predicate::new("age", Operator::Gt, "40", ValueType::Integer);
    assert_eq!(names(&db.query("User", &as_int).unwrap()), vec!["Old"]);

    // Lexicographically "9" > "40"
    let as_text = Predicate::new("age", Operator::Gt, "40", ValueType::String);
    assert_eq!(
        names(&db.query("User", &as_text).unwrap()),
        vec!["Old", "Teen"]
    );
}

#[test]
fn test_like_matches_substring() {
    let db = user_db();
    for name in ["Jane Smith", "John Doe", "Mary Jane", "jane lower"] {
        db.insert("User", json!({ "name": name })).unwrap();
    }

    let rows = db.query("User", &Predicate::like("name", "Jane")).unwrap();
    assert_eq!(names(&rows), vec!["Jane Smith", "Mary Jane"]);
}

#[test]
fn test_time_comparison() {
    let db = Database::in_memory();
    db.define_schema("Event", ["title", "at"], false).unwrap();
    db.insert("Event", json!({"title": "old", "at": "2020-01-01 10:00:00"}))
        .unwrap();
    db.insert("Event", json!({"title": "new", "at": "2024-06-01T08:30:00Z"}))
        .unwrap();

    let pred = Predicate::new("at", Operator::Lt, "2022-01-01", ValueType::Time);
    let rows = db.query("Event", &pred).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "old");
}

#[test]
fn test_uncoercible_comparison_value() {
    let db = user_db();
    db.insert("User", json!({"name": "A", "age": 3})).unwrap();

    let pred = Predicate::new("age", Operator::Gt, "forty", ValueType::Integer);
    assert!(matches!(
        db.query("User", &pred),
        Err(DbError::TypeCoercion { .. })
    ));
}

#[test]
fn test_query_unknown_attribute() {
    let db = user_db();
    assert!(matches!(
        db.query("User", &Predicate::is("nickname", "J")),
        Err(DbError::UnknownAttribute { .. })
    ));
}

#[test]
fn test_query_by_id() {
    let db = user_db();
    for name in ["a", "b", "c"] {
        db.insert("User", json!({ "name": name })).unwrap();
    }
    let pred = Predicate::new("id", Operator::Gt, "1", ValueType::Integer);
    assert_eq!(names(&db.query("User", &pred).unwrap()), vec!["b", "c"]);
}
