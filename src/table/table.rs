//! Table storage with identity assignment
//!
//! # Locking
//!
//! One reader/writer lock per table covers the record sequence and the id
//! counter together. `insert`, `update` and `delete` take it exclusively,
//! `get` and `scan` take it shared, so a reader always observes a state
//! between whole operations. There is no cross-table or multi-call
//! atomicity.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::record::{validate_payload, Record};
use crate::errors::{DbError, DbResult};
use crate::schema::Schema;

/// Records plus the id counter, guarded together
#[derive(Debug)]
struct TableState {
    /// Live records in insertion order
    records: Vec<Record>,
    /// Next id to hand out; strictly greater than every id ever issued
    next_id: u64,
}

/// A table of records conforming to one schema
#[derive(Debug)]
pub struct Table {
    schema: Arc<Schema>,
    state: RwLock<TableState>,
}

impl Table {
    /// Create an empty table; the first id issued is 1
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            state: RwLock::new(TableState {
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Rebuild a table from persisted records, keeping their ids.
    ///
    /// This is the only path that sets ids explicitly. The counter is
    /// raised past the largest restored id if the persisted one lags.
    pub(crate) fn restore(schema: Arc<Schema>, records: Vec<Record>, next_id: u64) -> Self {
        let max_id = records.iter().map(Record::id).max().unwrap_or(0);
        let next_id = next_id.max(max_id + 1);
        Self {
            schema,
            state: RwLock::new(TableState { records, next_id }),
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Insert a record and return its newly assigned id
    pub fn insert(&self, payload: Value) -> DbResult<u64> {
        let values: BTreeMap<String, Value> = validate_payload(&self.schema, payload)?
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();

        let mut state = self.write();
        let id = state.next_id;
        state.next_id += 1;
        state.records.push(Record::new(id, values));
        Ok(id)
    }

    /// Fetch a live record by id
    pub fn get(&self, id: u64) -> DbResult<Record> {
        self.read()
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| DbError::not_found(self.name(), id))
    }

    /// Partially update a record; attributes not in the payload keep
    /// their values and `id` is never changed.
    pub fn update(&self, id: u64, payload: Value) -> DbResult<u64> {
        let changes = validate_payload(&self.schema, payload)?;

        let mut state = self.write();
        let record = state
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| DbError::not_found(self.schema.name(), id))?;
        record.apply(changes);
        Ok(id)
    }

    /// Remove a live record. Returns whether anything was removed; a
    /// missing id is not an error.
    pub fn delete(&self, id: u64) -> bool {
        let mut state = self.write();
        let before = state.records.len();
        state.records.retain(|record| record.id() != id);
        state.records.len() != before
    }

    /// Copy of the live records in insertion order
    pub fn scan(&self) -> Vec<Record> {
        self.read().records.clone()
    }

    /// Records and counter captured under one read lock
    pub(crate) fn snapshot(&self) -> (Vec<Record>, u64) {
        let state = self.read();
        (state.records.clone(), state.next_id)
    }

    /// Next id this table will issue
    pub fn next_id(&self) -> u64 {
        self.read().next_id
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the Vec half-pushed, so
    // a poisoned guard is still usable.
    fn read(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
