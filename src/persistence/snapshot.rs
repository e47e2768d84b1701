//! Snapshot save and load

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::errors::{PersistenceError, PersistenceResult};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{validate_table_name, Schema, ID_ATTRIBUTE};
use crate::table::{AttributeMap, Record, Table};

/// Registry file name
pub const REGISTRY_FILE: &str = "tables.json";

/// Counts reported by a completed save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub tables: usize,
    pub records: usize,
}

/// Reads and writes snapshots in one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn registry_path(&self) -> PathBuf {
        self.dir.join(REGISTRY_FILE)
    }

    pub fn records_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }

    pub fn counter_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.index", table))
    }

    /// Write every table, then the registry of table names.
    ///
    /// Records are written with all schema attributes present (absent ones
    /// as null) so that the first record carries the full attribute list.
    pub fn save(&self, tables: &[Arc<Table>]) -> PersistenceResult<SaveSummary> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let mut summary = SaveSummary::default();
        for table in tables {
            let (records, next_id) = table.snapshot();
            let rows: Vec<AttributeMap> = records
                .iter()
                .map(|record| record.to_full_map(table.schema()))
                .collect();

            let path = self.records_path(table.name());
            let body = serde_json::to_vec_pretty(&rows)
                .map_err(|e| PersistenceError::malformed(&path, e.to_string()))?;
            write_atomic(&path, &body)?;
            write_atomic(&self.counter_path(table.name()), next_id.to_string().as_bytes())?;

            summary.tables += 1;
            summary.records += rows.len();
        }

        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        let path = self.registry_path();
        let body = serde_json::to_vec(&names)
            .map_err(|e| PersistenceError::malformed(&path, e.to_string()))?;
        write_atomic(&path, &body)?;

        Ok(summary)
    }

    /// Rebuild tables from the snapshot, in registry order.
    ///
    /// Missing files mean "nothing persisted". Tables whose record file is
    /// missing or holds no records are skipped, since their schema cannot be
    /// reconstructed.
    pub fn load(&self) -> PersistenceResult<Vec<Table>> {
        let registry_path = self.registry_path();
        let names: Vec<String> = match read_optional(&registry_path)? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| PersistenceError::malformed(&registry_path, e.to_string()))?,
            None => return Ok(Vec::new()),
        };

        // Names become file paths, so check them all before reading any
        for name in &names {
            validate_table_name(name)
                .map_err(|e| PersistenceError::malformed(&registry_path, e.to_string()))?;
        }

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            match self.load_table(&name)? {
                Some(table) => {
                    let records = table.len().to_string();
                    let next_id = table.next_id().to_string();
                    log_event_with_fields(
                        Event::TableRestored,
                        &[
                            ("table", table.name()),
                            ("records", records.as_str()),
                            ("next_id", next_id.as_str()),
                        ],
                    );
                    tables.push(table);
                }
                None => log_event_with_fields(Event::TableSkipped, &[("table", name.as_str())]),
            }
        }
        Ok(tables)
    }

    fn load_table(&self, name: &str) -> PersistenceResult<Option<Table>> {
        let path = self.records_path(name);
        let rows: Vec<AttributeMap> = match read_optional(&path)? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| PersistenceError::malformed(&path, e.to_string()))?,
            None => return Ok(None),
        };

        let first = match rows.first() {
            Some(first) => first,
            None => return Ok(None),
        };

        let schema = Schema::new(name, first.keys().cloned())
            .map_err(|e| PersistenceError::malformed(&path, e.to_string()))?;
        let schema = Arc::new(schema);

        let mut seen = HashSet::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record = restore_record(&schema, row, &path)?;
            if !seen.insert(record.id()) {
                return Err(PersistenceError::malformed(
                    &path,
                    format!("duplicate id {}", record.id()),
                ));
            }
            records.push(record);
        }

        let next_id = self.load_counter(name)?;
        Ok(Some(Table::restore(schema, records, next_id)))
    }

    /// Persisted next id, or 0 when absent
    fn load_counter(&self, name: &str) -> PersistenceResult<u64> {
        let path = self.counter_path(name);
        match read_optional(&path)? {
            Some(content) => content
                .trim()
                .parse::<u64>()
                .map_err(|e| PersistenceError::malformed(&path, e.to_string())),
            None => Ok(0),
        }
    }
}

fn restore_record(schema: &Schema, row: AttributeMap, path: &Path) -> PersistenceResult<Record> {
    let mut id = None;
    let mut values = BTreeMap::new();
    for (key, value) in row {
        if key == ID_ATTRIBUTE {
            id = value.as_u64();
            continue;
        }
        if !schema.contains(&key) {
            return Err(PersistenceError::malformed(
                path,
                format!("attribute '{}' is not in the first record", key),
            ));
        }
        match value {
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                return Err(PersistenceError::malformed(
                    path,
                    format!("attribute '{}' is not a scalar", key),
                ))
            }
            scalar => {
                values.insert(key, scalar);
            }
        }
    }

    let id = id.ok_or_else(|| PersistenceError::malformed(path, "record without a valid id"))?;
    Ok(Record::new(id, values))
}

/// File content, or `None` if the file is missing or blank
fn read_optional(path: &Path) -> PersistenceResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::io(path, e)),
    }
}

/// Write to a temporary sibling, fsync, then rename over the target
fn write_atomic(path: &Path, body: &[u8]) -> PersistenceResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut file = File::create(&tmp).map_err(|e| PersistenceError::io(&tmp, e))?;
    file.write_all(body).map_err(|e| PersistenceError::io(&tmp, e))?;
    file.sync_all().map_err(|e| PersistenceError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| PersistenceError::io(path, e))
}
