//! # HTTP API errors
//!
//! Maps engine errors onto status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::errors::DbError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Engine error
    #[error(transparent)]
    Db(#[from] DbError),

    /// Background task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Db(err) => match err {
                DbError::InvalidSchema(_)
                | DbError::UnknownAttribute { .. }
                | DbError::TypeCoercion { .. }
                | DbError::InvalidPayload(_)
                | DbError::InvalidPredicate(_) => StatusCode::BAD_REQUEST,

                DbError::UnknownTable(_) | DbError::NotFound { .. } => StatusCode::NOT_FOUND,

                DbError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Db(err) => err.code(),
            ApiError::Internal(_) => "ROWBASE_INTERNAL",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            status: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistenceError;
    use std::path::Path;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(DbError::UnknownTable("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DbError::not_found("User", 1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DbError::coercion("x", "time")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DbError::from(PersistenceError::malformed(Path::new("a"), "b")))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body() {
        let err = ApiError::from(DbError::not_found("User", 3));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "ROWBASE_NOT_FOUND");
        assert_eq!(body.status, 404);
        assert_eq!(body.error, "Row not found: User/3");
    }
}
