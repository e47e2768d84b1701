//! Database engine: schema registration plus per-table dispatch

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;

use crate::errors::{DbError, DbResult};
use crate::observability::{log_event, log_event_with_fields, Event, ObservationScope};
use crate::persistence::{SaveSummary, SnapshotStore};
use crate::query::{Predicate, PredicateFilter};
use crate::schema::{Schema, SchemaRegistry};
use crate::table::{AttributeMap, Table};

/// Name and full attribute list (including `id`) of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    pub name: String,
    pub attributes: Vec<String>,
}

/// Registry and tables, swapped together
#[derive(Debug, Default)]
struct Catalog {
    registry: SchemaRegistry,
    tables: HashMap<String, Arc<Table>>,
}

impl Catalog {
    fn define(&mut self, schema: Schema) -> bool {
        let schema = Arc::new(schema);
        if !self.registry.define(Arc::clone(&schema)) {
            return false;
        }
        self.tables
            .insert(schema.name().to_string(), Arc::new(Table::new(schema)));
        true
    }

    fn restore(&mut self, table: Table) -> bool {
        if !self.registry.define(Arc::clone(table.schema())) {
            return false;
        }
        self.tables.insert(table.name().to_string(), Arc::new(table));
        true
    }

    fn clear(&mut self) {
        self.registry.clear();
        self.tables.clear();
    }
}

/// The process-wide record store.
///
/// The catalog lock only guards the name -> table mapping; record
/// operations run under each table's own lock once the table is resolved.
#[derive(Debug)]
pub struct Database {
    catalog: RwLock<Catalog>,
    store: Option<SnapshotStore>,
}

impl Database {
    /// Database with no snapshot directory; `persist_all` is a no-op
    pub fn in_memory() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            store: None,
        }
    }

    /// Open a database backed by `data_dir`, restoring any snapshot there.
    ///
    /// An absent snapshot yields an empty database. A malformed one is an
    /// error and the caller must not start serving.
    pub fn open(data_dir: impl Into<PathBuf>) -> DbResult<Self> {
        let store = SnapshotStore::new(data_dir);
        let tables = store.load().map_err(|e| {
            if e.is_fatal() {
                let reason = e.to_string();
                log_event_with_fields(Event::SnapshotCorrupt, &[("reason", reason.as_str())]);
            }
            e
        })?;

        let mut catalog = Catalog::default();
        for table in tables {
            catalog.restore(table);
        }

        let count = catalog.registry.len().to_string();
        let dir = store.dir().display().to_string();
        log_event_with_fields(
            Event::SnapshotLoaded,
            &[("data_dir", dir.as_str()), ("tables", count.as_str())],
        );

        Ok(Self {
            catalog: RwLock::new(catalog),
            store: Some(store),
        })
    }

    /// Define one table. Returns whether it was newly created; an existing
    /// table of the same name is left as is. `reset` drops every table
    /// first.
    pub fn define_schema<I, S>(&self, name: &str, attributes: I, reset: bool) -> DbResult<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Schema::new(name, attributes)?;
        let created = self.apply_definitions(vec![schema], reset);
        Ok(!created.is_empty())
    }

    /// Define several tables at once.
    ///
    /// Every definition is validated before anything changes, so a bad
    /// entry leaves the database (and a requested reset) untouched.
    /// Returns the names that were newly created.
    pub fn define_schemas(
        &self,
        definitions: Vec<(String, Vec<String>)>,
        reset: bool,
    ) -> DbResult<Vec<String>> {
        if definitions.is_empty() {
            return Err(DbError::InvalidSchema("no tables in schema definition".into()));
        }
        let schemas = definitions
            .into_iter()
            .map(|(name, attributes)| Schema::new(name, attributes))
            .collect::<DbResult<Vec<_>>>()?;
        Ok(self.apply_definitions(schemas, reset))
    }

    fn apply_definitions(&self, schemas: Vec<Schema>, reset: bool) -> Vec<String> {
        let mut catalog = self.write_catalog();
        if reset {
            catalog.clear();
            log_event(Event::DatabaseReset);
        }

        let mut created = Vec::new();
        for schema in schemas {
            let name = schema.name().to_string();
            if catalog.define(schema) {
                log_event_with_fields(Event::SchemaDefined, &[("table", name.as_str())]);
                created.push(name);
            }
        }
        created
    }

    /// Every table with its attributes, in registration order
    pub fn list_schemas(&self) -> Vec<SchemaInfo> {
        self.read_catalog()
            .registry
            .iter()
            .map(|schema| SchemaInfo {
                name: schema.name().to_string(),
                attributes: schema.columns(),
            })
            .collect()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.read_catalog().registry.names()
    }

    /// Resolve a table by name
    pub fn table(&self, name: &str) -> DbResult<Arc<Table>> {
        self.read_catalog()
            .tables
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))
    }

    pub fn insert(&self, table: &str, payload: Value) -> DbResult<u64> {
        let id = self.table(table)?.insert(payload)?;
        let id_str = id.to_string();
        log_event_with_fields(Event::RecordInserted, &[("table", table), ("id", id_str.as_str())]);
        Ok(id)
    }

    pub fn get(&self, table: &str, id: u64) -> DbResult<AttributeMap> {
        let table = self.table(table)?;
        Ok(table.get(id)?.to_map(table.schema()))
    }

    pub fn update(&self, table: &str, id: u64, payload: Value) -> DbResult<u64> {
        let id = self.table(table)?.update(id, payload)?;
        let id_str = id.to_string();
        log_event_with_fields(Event::RecordUpdated, &[("table", table), ("id", id_str.as_str())]);
        Ok(id)
    }

    /// Delete by id; deleting an id that is not live succeeds
    pub fn delete(&self, table: &str, id: u64) -> DbResult<()> {
        let removed = self.table(table)?.delete(id);
        let id_str = id.to_string();
        let removed_str = removed.to_string();
        log_event_with_fields(
            Event::RecordDeleted,
            &[
                ("table", table),
                ("id", id_str.as_str()),
                ("removed", removed_str.as_str()),
            ],
        );
        Ok(())
    }

    /// Filter one table by a single predicate
    pub fn query(&self, table: &str, predicate: &Predicate) -> DbResult<Vec<AttributeMap>> {
        let result = self.table(table).and_then(|t| {
            PredicateFilter::execute(&t, predicate).map(|records| (t, records))
        });

        match result {
            Ok((resolved, records)) => {
                let rows = records.len().to_string();
                log_event_with_fields(
                    Event::QueryExecuted,
                    &[
                        ("table", table),
                        ("attribute", predicate.attribute.as_str()),
                        ("op", predicate.op.as_str()),
                        ("rows", rows.as_str()),
                    ],
                );
                let schema = resolved.schema();
                Ok(records.iter().map(|record| record.to_map(schema)).collect())
            }
            Err(e) => {
                log_event_with_fields(
                    Event::QueryRejected,
                    &[("table", table), ("code", e.code())],
                );
                Err(e)
            }
        }
    }

    /// Flush every table to the snapshot directory.
    ///
    /// On failure the in-memory state is unchanged and the error is
    /// returned to the caller.
    pub fn persist_all(&self) -> DbResult<SaveSummary> {
        let store = match &self.store {
            Some(store) => store,
            None => return Ok(SaveSummary::default()),
        };

        let tables: Vec<Arc<Table>> = {
            let catalog = self.read_catalog();
            catalog
                .registry
                .iter()
                .filter_map(|schema| catalog.tables.get(schema.name()).cloned())
                .collect()
        };

        let scope = ObservationScope::new("PERSIST");
        match store.save(&tables) {
            Ok(summary) => {
                let tables = summary.tables.to_string();
                let records = summary.records.to_string();
                scope.complete_with_fields(&[
                    ("tables", tables.as_str()),
                    ("records", records.as_str()),
                ]);
                Ok(summary)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e.into())
            }
        }
    }

    fn read_catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_catalog(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::in_memory()
    }
}
