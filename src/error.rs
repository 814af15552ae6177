use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use utoipa::ToSchema;

/// One violated constraint reported by a document schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Dotted path of the offending field (`personalInfo.email`)
    pub field: String,
    /// Human readable description of the violation
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    MissingField(String),
    SchemaValidation(Vec<FieldViolation>),
    NotFound(String),
    /// Carries the record that already occupies the slot.
    Conflict { message: String, existing: Value },
    MethodNotAllowed,
    DatabaseUnavailable(String),
    Database(String),
    SerializationError(String),
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::SchemaValidation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::DatabaseUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AppError::SchemaValidation(violations) => {
                write!(f, "Schema validation failed: {} violation(s)", violations.len())
            }
            AppError::NotFound(what) => write!(f, "Not found: {}", what),
            AppError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::DatabaseUnavailable(msg) => write!(f, "Database unavailable: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(e) => AppError::DatabaseUnavailable(e.to_string()),
            DbErr::ConnectionAcquire(e) => AppError::DatabaseUnavailable(e.to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = self.to_string();

        let body = match self {
            AppError::SchemaValidation(violations) => json!({
                "error": error_message,
                "details": violations,
            }),
            AppError::Conflict { existing, .. } => json!({
                "error": error_message,
                "data": existing,
            }),
            _ => json!({
                "error": error_message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
