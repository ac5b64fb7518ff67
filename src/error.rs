//! Application error taxonomy and its HTTP mapping.
//!
//! Every fallible operation in the service and repository layers returns
//! [`AppError`]. Handlers return it directly; [`IntoResponse`] renders the
//! JSON error envelope:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Short link not found", "details": {} } }
//! ```
//!
//! Click ingestion and link health probing never produce an `AppError` for the
//! caller: those failures are logged and counted instead.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload embedded in every error response.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed client input, e.g. a long URL that is not absolute.
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// A uniqueness constraint rejected an insert.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Persistence layer failure. `details.reason`, when present, is the
    /// underlying cause and is part of the display form.
    #[error("{message}{}", cause_suffix(.details))]
    Store { message: String, details: Value },

    /// No free short code was found within the retry budget.
    #[error("Failed to generate a unique short code after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    /// The operating system randomness source is unavailable.
    #[error("Secure random source unavailable: {0}")]
    RandomSource(String),
}

fn cause_suffix(details: &Value) -> String {
    match details.get("reason").and_then(Value::as_str) {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn store(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::Store { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            AppError::ExhaustedRetries { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "code_space_exhausted")
            }
            AppError::RandomSource(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into its public payload.
    ///
    /// Server-side failures are reduced to a generic message so that database
    /// or entropy details never leak to clients.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (status, code) = self.status_and_code();

        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details } => (message.clone(), details.clone()),
            _ if status.is_server_error() => ("Internal server error".to_string(), json!({})),
            other => (other.to_string(), json!({})),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::store("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();

        AppError::bad_request(
            "Request validation failed",
            json!({ "fields": fields, "reason": e.to_string() }),
        )
    }
}
