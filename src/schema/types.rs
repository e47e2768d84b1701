//! Schema type definitions

use serde::Serialize;

use crate::errors::{DbError, DbResult};

/// Name of the identity attribute present in every schema
pub const ID_ATTRIBUTE: &str = "id";

/// Immutable table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Table name, unique process-wide
    name: String,
    /// Declared attributes in definition order, excluding `id`
    attributes: Vec<String>,
}

impl Schema {
    /// Create a schema, validating the table and attribute names.
    ///
    /// A listed `id` is dropped since it is implicit. Duplicate attribute
    /// names are rejected.
    pub fn new<I, S>(name: impl Into<String>, attributes: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        validate_table_name(&name)?;

        let mut declared: Vec<String> = Vec::new();
        for attribute in attributes {
            let attribute = attribute.into();
            if attribute.trim().is_empty() {
                return Err(DbError::InvalidSchema(format!(
                    "table '{}' has an empty attribute name",
                    name
                )));
            }
            if attribute == ID_ATTRIBUTE {
                continue;
            }
            if declared.contains(&attribute) {
                return Err(DbError::InvalidSchema(format!(
                    "table '{}' declares attribute '{}' twice",
                    name, attribute
                )));
            }
            declared.push(attribute);
        }

        Ok(Self {
            name,
            attributes: declared,
        })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared attributes, excluding `id`
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Full attribute list with `id` first
    pub fn columns(&self) -> Vec<String> {
        std::iter::once(ID_ATTRIBUTE.to_string())
            .chain(self.attributes.iter().cloned())
            .collect()
    }

    /// Whether `attribute` belongs to this schema (including `id`)
    pub fn contains(&self, attribute: &str) -> bool {
        attribute == ID_ATTRIBUTE || self.attributes.iter().any(|a| a == attribute)
    }
}

/// Table names double as snapshot file names.
/// Rejects names that are empty or could escape the data directory
pub fn validate_table_name(name: &str) -> DbResult<()> {
    if name.trim().is_empty() {
        return Err(DbError::InvalidSchema("table name is empty".into()));
    }
    if name.starts_with('.') || name.contains(&['/', '\\', '\0'][..]) {
        return Err(DbError::InvalidSchema(format!(
            "table name '{}' is not allowed",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_start_with_id() {
        let schema = Schema::new("User", ["name", "email"]).unwrap();
        assert_eq!(schema.columns(), vec!["id", "name", "email"]);
        assert_eq!(schema.attributes(), &["name".to_string(), "email".to_string()]);
    }

    #[test]
    fn test_explicit_id_is_dropped() {
        let schema = Schema::new("User", ["id", "name"]).unwrap();
        assert_eq!(schema.attributes(), &["name".to_string()]);
        assert!(schema.contains("id"));
    }

    #[test]
    fn test_contains() {
        let schema = Schema::new("User", ["name"]).unwrap();
        assert!(schema.contains("name"));
        assert!(!schema.contains("age"));
    }

    #[test]
    fn test_rejects_empty_names() {
        assert!(matches!(
            Schema::new("", ["name"]),
            Err(DbError::InvalidSchema(_))
        ));
        assert!(matches!(
            Schema::new("User", [""]),
            Err(DbError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_attribute() {
        assert!(Schema::new("User", ["name", "name"]).is_err());
    }

    #[test]
    fn test_rejects_path_like_table_names() {
        assert!(Schema::new("../etc", ["a"]).is_err());
        assert!(Schema::new(".hidden", ["a"]).is_err());
        assert!(Schema::new("a\\b", ["a"]).is_err());
    }
}
