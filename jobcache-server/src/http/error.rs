//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Bodies carry both `message` and `detail` with the same text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Unknown key on a point lookup (404)
    NotFound { resource: &'static str, id: String },

    /// Connectivity probe or query failed (500, logged)
    Database(DbError),

    /// Snapshot reload failed (500, logged)
    Reload(DbError),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} '{}' not found", resource, id),
            ),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    format!("Database error: {}", e),
                )
            }
            Self::Reload(e) => {
                tracing::error!("Reload error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "reload_error",
                    format!("Reload error: {}", e),
                )
            }
        };

        let body = json!({
            "error": kind,
            "message": message,
            "detail": message,
        });

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}
