//! Record representation and payload validation

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::{DbError, DbResult};
use crate::schema::{Schema, ID_ATTRIBUTE};

/// JSON object view of a record, as handed across the engine boundary
pub type AttributeMap = serde_json::Map<String, Value>;

/// A single row: identity plus a schema-checked attribute bag.
///
/// Values are kept in the JSON form they were received in. Absent
/// attributes are simply not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: u64,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub(crate) fn new(id: u64, values: BTreeMap<String, Value>) -> Self {
        Self { id, values }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Looks up an attribute value; `id` resolves to the identity.
    pub fn value(&self, attribute: &str) -> Option<Cow<'_, Value>> {
        if attribute == ID_ATTRIBUTE {
            return Some(Cow::Owned(Value::from(self.id)));
        }
        self.values.get(attribute).map(Cow::Borrowed)
    }

    /// Attribute map in schema order with `id` first, omitting absent
    /// attributes
    pub fn to_map(&self, schema: &Schema) -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert(ID_ATTRIBUTE.to_string(), Value::from(self.id));
        for attribute in schema.attributes() {
            if let Some(value) = self.values.get(attribute) {
                map.insert(attribute.clone(), value.clone());
            }
        }
        map
    }

    /// Attribute map with every schema column present, absent ones as null
    pub fn to_full_map(&self, schema: &Schema) -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert(ID_ATTRIBUTE.to_string(), Value::from(self.id));
        for attribute in schema.attributes() {
            let value = self.values.get(attribute).cloned().unwrap_or(Value::Null);
            map.insert(attribute.clone(), value);
        }
        map
    }

    /// Overwrites the given attributes; a null value clears the attribute.
    pub(crate) fn apply(&mut self, changes: Vec<(String, Value)>) {
        for (key, value) in changes {
            if value.is_null() {
                self.values.remove(&key);
            } else {
                self.values.insert(key, value);
            }
        }
    }
}

/// Checks an insert/update payload against the schema.
///
/// The payload must be a JSON object of scalars whose keys belong to the
/// schema. Any `id` key is dropped since ids are never caller-assigned.
pub(crate) fn validate_payload(schema: &Schema, payload: Value) -> DbResult<Vec<(String, Value)>> {
    let object = match payload {
        Value::Object(object) => object,
        other => {
            return Err(DbError::InvalidPayload(format!(
                "expected an attribute object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut values = Vec::with_capacity(object.len());
    for (key, value) in object {
        if key == ID_ATTRIBUTE {
            continue;
        }
        if !schema.contains(&key) {
            return Err(DbError::unknown_attribute(schema.name(), key));
        }
        if value.is_array() || value.is_object() {
            return Err(DbError::InvalidPayload(format!(
                "attribute '{}' must be a scalar, got {}",
                key,
                json_kind(&value)
            )));
        }
        values.push((key, value));
    }
    Ok(values)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
