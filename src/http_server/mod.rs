//! # rowbase HTTP server
//!
//! Thin routing layer mapping HTTP verbs onto `Database` operations.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /stats` - Per-table record counts
//! - `GET /schema`, `POST /schema[?clear=true]` - List / define tables
//! - `POST /:table` - Insert
//! - `GET|PUT|DELETE /:table/:id` - Fetch / update / delete
//! - `GET /:table/:attribute/:op/:value[?type=...]` - Predicate query
//! - `GET /persist` - Flush a snapshot

pub mod config;
pub mod database_routes;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{shutdown_signal, HttpServer};
