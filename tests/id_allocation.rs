//! Id Allocation Tests
//!
//! Ids assigned by a table are strictly increasing and never reused,
//! including when inserts race with deletes on other threads.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rowbase::Database;
use serde_json::json;

const THREADS: usize = 8;
const INSERTS_PER_THREAD: usize = 200;

fn shared_db() -> Arc<Database> {
    let db = Database::in_memory();
    db.define_schema("Item", ["label", "worker"], false).unwrap();
    Arc::new(db)
}

/// Sequential inserts interleaved with deletes keep counting up.
#[test]
fn test_ids_increase_across_deletes() {
    let db = shared_db();
    let mut last = 0;
    for i in 0..50 {
        let id = db.insert("Item", json!({ "label": i })).unwrap();
        assert!(id > last, "id {} not greater than {}", id, last);
        last = id;
        if i % 3 == 0 {
            db.delete("Item", id).unwrap();
        }
    }

    // Deleting the newest record does not free its id
    db.delete("Item", last).unwrap();
    assert_eq!(db.insert("Item", json!({})).unwrap(), last + 1);
}

/// Concurrent inserters never observe the same id, and each thread sees
/// its own ids in increasing order.
#[test]
fn test_concurrent_inserts_get_distinct_ids() {
    let db = shared_db();

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(INSERTS_PER_THREAD);
                for i in 0..INSERTS_PER_THREAD {
                    let id = db
                        .insert("Item", json!({ "label": i, "worker": worker }))
                        .unwrap();
                    ids.push(id);
                    // Delete every other record to interleave writers
                    if i % 2 == 1 {
                        db.delete("Item", id).unwrap();
                    }
                }
                ids
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let ids = handle.join().unwrap();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        for id in ids {
            assert!(seen.insert(id), "id {} assigned twice", id);
        }
    }

    let total = THREADS * INSERTS_PER_THREAD;
    assert_eq!(seen.len(), total);
    assert_eq!(seen.iter().copied().max(), Some(total as u64));
    assert_eq!(db.table("Item").unwrap().len(), total / 2);
}

/// Two writers updating different attributes of one record never lose
/// each other's changes.
#[test]
fn test_concurrent_partial_updates_all_land() {
    let db = shared_db();
    let id = db
        .insert("Item", json!({"label": 0, "worker": 0}))
        .unwrap();

    const ROUNDS: i64 = 500;
    let writers: Vec<_> = ["label", "worker"]
        .into_iter()
        .map(|attribute| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 1..=ROUNDS {
                    db.update("Item", id, json!({ attribute: i })).unwrap();
                    let row = db.get("Item", id).unwrap();
                    // Our own write is never rolled back by the other writer
                    assert!(row[attribute].as_i64().unwrap() >= i);
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    let row = db.get("Item", id).unwrap();
    assert_eq!(row["label"], ROUNDS);
    assert_eq!(row["worker"], ROUNDS);
}

/// Readers never see a partially applied update.
#[test]
fn test_readers_see_whole_updates() {
    let db = shared_db();
    let id = db
        .insert("Item", json!({"label": "0", "worker": "0"}))
        .unwrap();

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for i in 1..500 {
                let v = i.to_string();
                db.update("Item", id, json!({"label": v, "worker": v}))
                    .unwrap();
            }
        })
    };

    for _ in 0..500 {
        let row = db.get("Item", id).unwrap();
        assert_eq!(row["label"], row["worker"]);
    }
    writer.join().unwrap();
}
