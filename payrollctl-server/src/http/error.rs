//! API error types with IntoResponse
//!
//! Errors are converted to JSON `{"error", "message"}` bodies with an
//! appropriate status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Query failed (500, logged)
    Database(DbError),

    /// CSV export could not start (500, logged)
    Export { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Export { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Driver message without the `DbError` prefix.
fn db_detail(e: &DbError) -> String {
    match e {
        DbError::Sqlx(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::Database(e) => {
                let message = format!("Database error: {}", db_detail(e));
                tracing::error!("{}", message);
                json!({
                    "error": "database_error",
                    "message": message
                })
            }
            Self::Export { message } => {
                let message = format!("Export error: {}", message);
                tracing::error!("{}", message);
                json!({
                    "error": "export_error",
                    "message": message
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}

impl ApiError {
    /// Wrap a failure that happened while preparing an export.
    pub fn export(e: impl std::fmt::Display) -> Self {
        Self::Export {
            message: e.to_string(),
        }
    }
}
