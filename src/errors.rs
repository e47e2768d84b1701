//! Engine error taxonomy
//!
//! Every engine operation returns a typed error. The engine never recovers
//! locally and never retries; mapping to a user-facing response is the
//! caller's job (see `http_server::errors`).

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Result type for engine operations
pub type DbResult<T> = Result<T, DbError>;

/// Engine errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Missing or malformed schema definition
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Operation against a table that was never defined
    #[error("No such table: {0}")]
    UnknownTable(String),

    /// Payload or predicate references an attribute outside the schema
    #[error("Unknown attribute '{attribute}' for table '{table}'")]
    UnknownAttribute { table: String, attribute: String },

    /// Id does not resolve to a live record
    #[error("Row not found: {table}/{id}")]
    NotFound { table: String, id: u64 },

    /// Comparison or stored value cannot be parsed under the declared type
    #[error("Cannot coerce {value} to {target}")]
    TypeCoercion { value: String, target: &'static str },

    /// Malformed insert/update data
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Unrecognised operator or declared type name
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    /// Snapshot read/write failure
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DbError {
    pub fn unknown_attribute(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        DbError::UnknownAttribute {
            table: table.into(),
            attribute: attribute.into(),
        }
    }

    pub fn not_found(table: impl Into<String>, id: u64) -> Self {
        DbError::NotFound {
            table: table.into(),
            id,
        }
    }

    pub fn coercion(value: impl Into<String>, target: &'static str) -> Self {
        DbError::TypeCoercion {
            value: value.into(),
            target,
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            DbError::InvalidSchema(_) => "ROWBASE_INVALID_SCHEMA",
            DbError::UnknownTable(_) => "ROWBASE_UNKNOWN_TABLE",
            DbError::UnknownAttribute { .. } => "ROWBASE_UNKNOWN_ATTRIBUTE",
            DbError::NotFound { .. } => "ROWBASE_NOT_FOUND",
            DbError::TypeCoercion { .. } => "ROWBASE_TYPE_COERCION",
            DbError::InvalidPayload(_) => "ROWBASE_INVALID_PAYLOAD",
            DbError::InvalidPredicate(_) => "ROWBASE_INVALID_PREDICATE",
            DbError::Persistence(e) => e.code(),
        }
    }

    /// True for errors caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DbError::Persistence(_))
    }
}
