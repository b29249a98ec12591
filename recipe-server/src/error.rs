//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipe_core::{CoreError, FieldErrors};
use thiserror::Error;

use crate::db::StoreError;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication error with specific error code
    #[error("{message}")]
    AuthError { message: String, code: String },

    /// Core error - rejected filter, payload or owner check
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store error - failure in the persistence backend
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an authentication error with a specific error code
    pub fn auth_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Create a validation error for a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Core(CoreError::Validation(FieldErrors::single(field, message)))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Core(ref e) => match e {
                CoreError::InvalidFilterFormat { .. } | CoreError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            },
            Self::Store(ref e) => match e {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Migration(_) | StoreError::Query(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::AuthError { code, .. } => code.as_str(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Core(ref e) => match e {
                CoreError::InvalidFilterFormat { .. } => "INVALID_FILTER_FORMAT",
                CoreError::Validation(_) => "VALIDATION_FAILED",
                CoreError::NotFound { .. } => "NOT_FOUND",
            },
            Self::Store(ref e) => match e {
                StoreError::NotFound { .. } => "NOT_FOUND",
                StoreError::Connection(_) => "DATABASE_UNAVAILABLE",
                StoreError::Migration(_) | StoreError::Query(_) => "DATABASE_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::Core(CoreError::InvalidFilterFormat { param, .. }) => {
                format!("'{}' must be a comma-separated list of integer ids", param)
            }
            Self::Core(CoreError::Validation(_)) => "Invalid input".to_string(),
            Self::Core(CoreError::NotFound { kind, .. }) => format!("{} not found", kind),
            Self::Store(StoreError::NotFound { kind, .. }) => format!("{} not found", kind),
            // Never leak database details to clients
            Self::Store(_) => "A database error occurred".to_string(),
            _ => self.to_string(),
        }
    }

    /// Field-level messages, present only for validation failures
    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Core(CoreError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::AuthError { .. } => "auth_error",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::Core(_) => "core",
            Self::Store(_) => "store",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Server error"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Authentication error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        }

        // All error responses include a `code` field for programmatic error handling
        let mut body = serde_json::json!({
            "error": client_message,
            "code": code,
        });
        if let Some(fields) = self.field_errors() {
            body["fields"] = serde_json::json!(fields);
        }

        (status, Json(body)).into_response()
    }
}
