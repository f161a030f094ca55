//! Error handling module for the Sunny backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const REMOTE_READ_ERROR: &str = "REMOTE_READ_ERROR";
    pub const REMOTE_WRITE_ERROR: &str = "REMOTE_WRITE_ERROR";
    pub const WEATHER_UNAVAILABLE: &str = "WEATHER_UNAVAILABLE";
    pub const SUPERSEDED: &str = "SUPERSEDED";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// A single sub-step of a reconciliation that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedStep {
    /// `delete` or `upsert`
    pub step: String,
    /// Affected record ids
    pub ids: Vec<String>,
    pub message: String,
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Admin session required or credentials rejected
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Admin input failed validation
    Validation(String),
    /// Malformed request
    BadRequest(String),
    /// Listing existing ids failed; nothing was mutated
    RemoteRead(String),
    /// A delete or upsert failed; the collection may be partially applied
    RemoteWrite {
        message: String,
        failed: Vec<FailedStep>,
    },
    /// Weather lookup failed; the caller may retry manually
    WeatherUnavailable(String),
    /// A newer query from the same requester replaced this one
    Superseded(String),
    /// Database error
    Database(String),
    /// Snapshot storage error
    Storage(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RemoteRead(_) => StatusCode::BAD_GATEWAY,
            AppError::RemoteWrite { .. } => StatusCode::BAD_GATEWAY,
            AppError::WeatherUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Superseded(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::RemoteRead(_) => codes::REMOTE_READ_ERROR,
            AppError::RemoteWrite { .. } => codes::REMOTE_WRITE_ERROR,
            AppError::WeatherUnavailable(_) => codes::WEATHER_UNAVAILABLE,
            AppError::Superseded(_) => codes::SUPERSEDED,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::RemoteRead(msg) => msg.clone(),
            AppError::RemoteWrite { message, .. } => message.clone(),
            AppError::WeatherUnavailable(msg) => msg.clone(),
            AppError::Superseded(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Extra structured context for the response envelope.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::RemoteWrite { failed, .. } => {
                Some(serde_json::json!({ "failedSteps": failed }))
            }
            AppError::WeatherUnavailable(_) => Some(serde_json::json!({ "retryable": true })),
            _ => None,
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
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {:?}", err);
        AppError::Storage(format!("Storage error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Weather provider error: {:?}", err);
        AppError::WeatherUnavailable(format!("Weather data is unavailable: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details: error.details(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
