use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::services::ServiceError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Conflict: {0}")]
    Conflict(String, Option<serde_json::Value>),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(..) => StatusCode::CONFLICT,
            AppError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidOperation(_) => "INVALID_OPERATION",
            AppError::Conflict(..) => "CONFLICT",
            AppError::OperationFailed(_) => "OPERATION_FAILED",
        }
    }

    fn log(&self) {
        match self {
            // Misses are routine; never log which lookup missed.
            AppError::NotFound(_) => debug!(code = self.code(), "Not found"),
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::InvalidOperation(msg)
            | AppError::Conflict(msg, _) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::OperationFailed(msg) => {
                error!(code = self.code(), message = %msg, "Application error");
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::NotFound(resource) => AppError::NotFound(format!("{resource} not found")),
            ServiceError::InvalidOperation(msg) => AppError::InvalidOperation(msg),
            ServiceError::OperationFailed(msg) => AppError::OperationFailed(msg),
            ServiceError::Validation(msg) => AppError::ValidationError(msg),
            ServiceError::CapacityExceeded { remaining } => {
                AppError::Conflict(message, Some(json!({ "remaining_seats": remaining })))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Services only put client-safe text in these messages
        let (public_message, details) = match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidOperation(msg)
            | AppError::OperationFailed(msg) => (msg, None),
            AppError::Conflict(msg, details) => (msg, details),
        };

        error_response(code, public_message, details, status)
    }
}
