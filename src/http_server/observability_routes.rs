//! Observability HTTP Routes
//!
//! Health and table statistics.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::database_routes::DatabaseState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Per-table statistics
#[derive(Debug, Serialize)]
pub struct TableStats {
    pub name: String,
    pub records: usize,
    pub next_id: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub tables: Vec<TableStats>,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Statistics route
pub fn stats_routes(state: Arc<DatabaseState>) -> Router {
    Router::new()
        .route("/stats", get(stats_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn stats_handler(State(state): State<Arc<DatabaseState>>) -> Json<StatsResponse> {
    let tables = state
        .db
        .table_names()
        .into_iter()
        .filter_map(|name| state.db.table(&name).ok())
        .map(|table| TableStats {
            name: table.name().to_string(),
            records: table.len(),
            next_id: table.next_id(),
        })
        .collect();

    Json(StatsResponse { tables })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
    }
}
