//! Database HTTP Routes
//!
//! One route per engine operation. Handlers only parse arguments, call the
//! `Database` and shape the JSON response.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::database::Database;
use crate::errors::DbError;
use crate::query::{Operator, Predicate, ValueType};
use crate::table::AttributeMap;

// ==================
// Shared State
// ==================

/// Database state shared across handlers
pub struct DatabaseState {
    pub db: Arc<Database>,
}

impl DatabaseState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct DefineSchemaParams {
    /// Drop every table before applying the definition. Any value other
    /// than `false` counts, so `?clear`, `?clear=1` and `?clear=true` all reset.
    #[serde(default)]
    pub clear: Option<String>,
}

impl DefineSchemaParams {
    pub fn reset_requested(&self) -> bool {
        match self.clear.as_deref() {
            Some(raw) => !raw.trim().eq_ignore_ascii_case("false"),
            None => false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SchemaCreatedResponse {
    pub message: String,
    pub created: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistResponse {
    pub tables: usize,
    pub records: usize,
}

// ==================
// Database Routes
// ==================

/// Create database routes
pub fn database_routes(state: Arc<DatabaseState>) -> Router {
    Router::new()
        .route("/schema", get(list_schemas_handler).post(define_schema_handler))
        .route("/persist", get(persist_handler))
        .route("/:table", post(insert_handler))
        .route(
            "/:table/:id",
            get(get_record_handler)
                .put(update_record_handler)
                .delete(delete_record_handler),
        )
        .route("/:table/:attribute/:op/:value", get(query_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| DbError::InvalidPayload(format!("'{}' is not a record id", raw)).into())
}

fn row_payload(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|e| DbError::InvalidPayload(e.body_text()).into())
}

/// `{"Table": ["attr", ...], ...}` into ordered definitions
fn parse_schema_body(body: Value) -> ApiResult<Vec<(String, Vec<String>)>> {
    let object = match body {
        Value::Object(object) if !object.is_empty() => object,
        _ => {
            return Err(DbError::InvalidSchema(
                "expected an object of table name to attribute list".into(),
            )
            .into())
        }
    };

    object
        .into_iter()
        .map(|(table, attributes)| -> ApiResult<(String, Vec<String>)> {
            let attributes: Vec<String> = serde_json::from_value(attributes).map_err(|_| {
                DbError::InvalidSchema(format!(
                    "attributes of '{}' must be a list of names",
                    table
                ))
            })?;
            Ok((table, attributes))
        })
        .collect()
}

// ==================
// Schema Handlers
// ==================

async fn list_schemas_handler(State(state): State<Arc<DatabaseState>>) -> Json<Value> {
    let listing: serde_json::Map<String, Value> = state
        .db
        .list_schemas()
        .into_iter()
        .map(|info| (info.name, Value::from(info.attributes)))
        .collect();
    Json(Value::Object(listing))
}

async fn define_schema_handler(
    State(state): State<Arc<DatabaseState>>,
    Query(params): Query<DefineSchemaParams>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SchemaCreatedResponse>> {
    let body = body.map_err(|e| ApiError::from(DbError::InvalidSchema(e.body_text())))?;
    let definitions = parse_schema_body(body.0)?;
    let created = state
        .db
        .define_schemas(definitions, params.reset_requested())?;

    Ok(Json(SchemaCreatedResponse {
        message: "Schema Created".to_string(),
        created,
    }))
}

// ==================
// Record Handlers
// ==================

async fn insert_handler(
    State(state): State<Arc<DatabaseState>>,
    Path(table): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<IdResponse>> {
    let payload = row_payload(body)?;
    let id = state.db.insert(&table, payload)?;
    Ok(Json(IdResponse { id }))
}

async fn get_record_handler(
    State(state): State<Arc<DatabaseState>>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Json<AttributeMap>> {
    let id = parse_id(&id)?;
    Ok(Json(state.db.get(&table, id)?))
}

async fn update_record_handler(
    State(state): State<Arc<DatabaseState>>,
    Path((table, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<IdResponse>> {
    let id = parse_id(&id)?;
    let payload = row_payload(body)?;
    let id = state.db.update(&table, id, payload)?;
    Ok(Json(IdResponse { id }))
}

async fn delete_record_handler(
    State(state): State<Arc<DatabaseState>>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Json<DeletedResponse>> {
    let id = parse_id(&id)?;
    state.db.delete(&table, id)?;
    Ok(Json(DeletedResponse { deleted: id }))
}

async fn query_handler(
    State(state): State<Arc<DatabaseState>>,
    Path((table, attribute, op, value)): Path<(String, String, String, String)>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Vec<AttributeMap>>> {
    let op: Operator = op.parse()?;
    let value_type = match params.value_type.as_deref() {
        Some(raw) => raw.parse::<ValueType>()?,
        None => ValueType::default(),
    };
    let predicate = Predicate::new(attribute, op, value, value_type);
    Ok(Json(state.db.query(&table, &predicate)?))
}

// ==================
// Persistence Handler
// ==================

async fn persist_handler(
    State(state): State<Arc<DatabaseState>>,
) -> ApiResult<Json<PersistResponse>> {
    let db = Arc::clone(&state.db);
    let summary = tokio::task::spawn_blocking(move || db.persist_all())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(PersistResponse {
        tables: summary.tables,
        records: summary.records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_schema_body() {
        let defs = parse_schema_body(json!({"User": ["name", "email"], "Article": []})).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0], ("User".to_string(), vec!["name".to_string(), "email".to_string()]));
        assert_eq!(defs[1].0, "Article");
    }

    #[test]
    fn test_parse_schema_body_rejects_bad_shapes() {
        assert!(parse_schema_body(json!({})).is_err());
        assert!(parse_schema_body(json!(["User"])).is_err());
        assert!(parse_schema_body(json!({"User": "name"})).is_err());
        assert!(parse_schema_body(json!({"User": [1, 2]})).is_err());
    }

    #[test]
    fn test_clear_param_is_truthy() {
        let params = |clear: Option<&str>| DefineSchemaParams {
            clear: clear.map(str::to_string),
        };
        assert!(!params(None).reset_requested());
        assert!(params(Some("true")).reset_requested());
        assert!(params(Some("1")).reset_requested());
        assert!(params(Some("yes")).reset_requested());
        assert!(params(Some("")).reset_requested());
        assert!(!params(Some("false")).reset_requested());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.code(), "ROWBASE_INVALID_PAYLOAD");
    }
}
