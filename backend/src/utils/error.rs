use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// API Error with rich context and automatic error trait implementations
///
/// Design: Uses thiserror for ergonomic error handling with context.
/// Each variant carries meaningful context to help with debugging.
#[derive(Error, Debug)]
pub enum ApiError {
    // Validation errors 1xxx
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors 2xxx
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Dataset {name} not found")]
    DatasetNotFound { name: String },

    // Conflict errors 3xxx
    #[error("Dataset {name} already exists")]
    DatasetExists { name: String },

    // System errors 5xxx
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Generic wrapper for other errors - auto-convert from anyhow::Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Helper to create validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Helper to create invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Helper to create not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound(message.into())
    }

    /// Helper to create dataset not found error
    pub fn dataset_not_found(name: impl Into<String>) -> Self {
        Self::DatasetNotFound { name: name.into() }
    }

    /// Helper to create dataset exists error
    pub fn dataset_exists(name: impl Into<String>) -> Self {
        Self::DatasetExists { name: name.into() }
    }

    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Stable error code exposed to the frontend
    pub fn error_code(&self) -> i32 {
        match self {
            // Validation errors 1xxx
            Self::ValidationError(_) => 1001,
            Self::InvalidInput(_) => 1002,

            // Resource errors 2xxx
            Self::ResourceNotFound(_) => 2001,
            Self::DatasetNotFound { .. } => 2002,

            // Conflict errors 3xxx
            Self::DatasetExists { .. } => 3001,

            // System errors 5xxx
            Self::InternalError(_) => 5001,
            Self::Io(_) => 5002,
            Self::Csv(_) => 5003,
            Self::Other(_) => 5001,
        }
    }
}

/// Error response body sent to the frontend
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let message = self.to_string();

        let status = match code {
            1001..=1999 => StatusCode::BAD_REQUEST,
            2001..=2999 => StatusCode::NOT_FOUND,
            3001..=3999 => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = ApiErrorResponse { code, message, details: None };

        (status, Json(response)).into_response()
    }
}

/// Implement From for serde_json::Error
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal_error(format!("JSON serialization error: {}", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
