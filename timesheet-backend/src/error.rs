// src/error.rs

use crate::domain::entry_lifecycle::LifecycleError;
use crate::domain::time_entry_status::TimeEntryStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Time entry is locked in status {status}")]
    EntryLocked { status: TimeEntryStatus },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: TimeEntryStatus,
        to: TimeEntryStatus,
    },

    #[error("Nothing to process: {0}")]
    NoEntries(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Locked { status } => AppError::EntryLocked { status },
            LifecycleError::InvalidTransition { from, to } => {
                AppError::InvalidTransition { from, to }
            }
        }
    }
}

impl AppError {
    fn plain(
        status: StatusCode,
        error_type: &str,
        message: String,
    ) -> (StatusCode, ErrorResponse) {
        (
            status,
            ErrorResponse {
                success: false,
                error: message.clone(),
                message,
                details: None,
                validation_errors: None,
                errors: None,
                error_type: error_type.to_string(),
            },
        )
    }

    fn field_errors(
        status: StatusCode,
        field_errors: HashMap<String, Vec<String>>,
        errors: Vec<serde_json::Value>,
    ) -> (StatusCode, ErrorResponse) {
        (
            status,
            ErrorResponse {
                success: false,
                error: "Validation failed".to_string(),
                message: "Validation failed".to_string(),
                details: None,
                validation_errors: Some(field_errors),
                errors: Some(errors),
                error_type: "validation_errors".to_string(),
            },
        )
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::DbErr(db_err) => {
                error!(error = ?db_err, "Database error");

                let (status, message, details) = match &db_err {
                    DbErr::RecordNotFound(entity) => (
                        StatusCode::NOT_FOUND,
                        "The requested resource was not found".to_string(),
                        Some(json!({ "entity": entity })),
                    ),
                    DbErr::Exec(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A database operation failed".to_string(),
                        Some(json!({ "operation": "exec" })),
                    ),
                    DbErr::Query(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A database query failed".to_string(),
                        Some(json!({ "operation": "query" })),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A database error occurred".to_string(),
                        None,
                    ),
                };

                let (status, mut body) = Self::plain(status, "database_error", message);
                body.details = details;
                (status, body)
            }
            AppError::NotFound(message) => Self::plain(StatusCode::NOT_FOUND, "not_found", message),
            AppError::ValidationError(message) => {
                Self::plain(StatusCode::BAD_REQUEST, "validation_error", message)
            }
            AppError::ValidationErrors(errors) => {
                let mut field_errors = HashMap::new();
                for error in &errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_insert_with(Vec::new)
                            .push(message.to_string());
                    }
                }
                let errors_array = errors.iter().map(|e| json!({ "message": e })).collect();
                Self::field_errors(StatusCode::BAD_REQUEST, field_errors, errors_array)
            }
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                let errors_array = field_errors
                    .iter()
                    .flat_map(|(field, messages)| {
                        messages
                            .iter()
                            .map(move |msg| json!({ "message": format!("{}: {}", field, msg) }))
                    })
                    .collect();
                Self::field_errors(StatusCode::BAD_REQUEST, field_errors, errors_array)
            }
            AppError::BadRequest(message) => {
                Self::plain(StatusCode::BAD_REQUEST, "bad_request", message)
            }
            AppError::Unauthorized(message) => {
                Self::plain(StatusCode::UNAUTHORIZED, "unauthorized", message)
            }
            AppError::Forbidden(message) => Self::plain(StatusCode::FORBIDDEN, "forbidden", message),
            AppError::EntryLocked { status } => {
                let (code, mut body) = Self::plain(
                    StatusCode::CONFLICT,
                    "entry_locked",
                    format!("Time entry can no longer be modified (status: {})", status),
                );
                body.details = Some(json!({ "status": status.as_str() }));
                (code, body)
            }
            AppError::InvalidTransition { from, to } => {
                let (code, mut body) = Self::plain(
                    StatusCode::CONFLICT,
                    "invalid_transition",
                    format!("Cannot move a time entry from {} to {}", from, to),
                );
                body.details = Some(json!({ "from": from.as_str(), "to": to.as_str() }));
                (code, body)
            }
            AppError::NoEntries(message) => {
                Self::plain(StatusCode::UNPROCESSABLE_ENTITY, "no_entries", message)
            }
            AppError::InternalServerError(message) => {
                error!(message = %message, "Internal server error");
                Self::plain(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_server_error",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}
