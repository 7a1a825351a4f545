//! Errors surfaced by the record store and its workflows.
//!
//! Every failure leaves the API as `{ success: false, error: { code, message, details? } }`.
//! Stale writes carry the stored version in `details.currentVersion` so the
//! client can re-read and retry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Values of `error.code` in the response envelope.
pub mod codes {
    /// No active record with that ID in the tenant, or an unusable token.
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// A record or workflow rule was broken, e.g. insufficient leave days.
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// The ID or unique key is already taken.
    pub const CONFLICT: &str = "CONFLICT";
    /// `expectedVersion` or a concurrent writer beat this update.
    pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    /// Body, query string or header could not be read.
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Validation(String),
    AlreadyExists(String),
    /// Optimistic concurrency check failed.
    Conflict {
        message: String,
        current_version: i64,
    },
    Database(String),
    Internal(String),
    BadRequest(String),
}

impl AppError {
    /// `<label> <id> not found`, the message every record lookup uses.
    pub fn missing(label: &str, id: &str) -> Self {
        AppError::NotFound(format!("{} {} not found", label, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// The stored record moved on to `current_version`.
    pub fn stale(message: impl Into<String>, current_version: i64) -> Self {
        AppError::Conflict {
            message: message.into(),
            current_version,
        }
    }

    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, codes::NOT_FOUND),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, codes::BAD_REQUEST),
            AppError::AlreadyExists(_) => (StatusCode::CONFLICT, codes::CONFLICT),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, codes::VERSION_MISMATCH),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, codes::DATABASE_ERROR),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    pub fn error_code(&self) -> &'static str {
        self.classify().1
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::AlreadyExists(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg) => msg,
            AppError::Conflict { message, .. } => message,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Two writers racing for the same record ID hit the primary key.
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                tracing::warn!("Duplicate record rejected by the store: {}", db);
                return AppError::AlreadyExists("Record already exists".to_string());
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("Rejected JSON: {}", err);
        AppError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let details = match error {
            AppError::Conflict {
                current_version, ..
            } => Some(serde_json::json!({ "currentVersion": current_version })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message().to_string(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
