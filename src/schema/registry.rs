//! In-memory schema registry
//!
//! Keeps schemas in registration order; that order is also the order of
//! the persisted table-name list.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::Schema;

/// Registry of table schemas, keyed by table name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    /// Schemas in registration order
    schemas: Vec<Arc<Schema>>,
    /// Table name -> position in `schemas`
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema if its name is new.
    ///
    /// Returns false when the name was already taken; the existing schema
    /// is left untouched.
    pub fn define(&mut self, schema: Arc<Schema>) -> bool {
        if self.by_name.contains_key(schema.name()) {
            return false;
        }
        self.by_name
            .insert(schema.name().to_string(), self.schemas.len());
        self.schemas.push(schema);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.by_name.get(name).map(|&idx| &self.schemas[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Schemas in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.iter()
    }

    /// Table names in registration order
    pub fn names(&self) -> Vec<String> {
        self.schemas.iter().map(|s| s.name().to_string()).collect()
    }

    /// Drops every schema
    pub fn clear(&mut self) {
        self.schemas.clear();
        self.by_name.clear();
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
