// ABOUTME: Application error type for API handlers
// ABOUTME: Maps layer errors to HTTP status codes and machine-readable codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use procura_core::validation::ValidationError;
use procura_lifecycle::LifecycleError;
use procura_storage::StorageError;

/// Main application error type that all handlers should return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Subscription expired")]
    SubscriptionExpired,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Storage error")]
    Storage(#[from] StorageError),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::Validation(message) => AppError::Validation(message),
            LifecycleError::NotFound => AppError::NotFound,
            LifecycleError::Conflict(message) => AppError::Conflict(message),
            LifecycleError::Storage(e) => AppError::Storage(e),
        }
    }
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

/// Error detail structure with machine-readable codes
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AppError {
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::SubscriptionExpired => (StatusCode::FORBIDDEN, "SUBSCRIPTION_EXPIRED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Storage(e) => match e {
                StorageError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }

    /// User-safe message. Internal detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Storage(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.to_status_and_code();
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            error!(request_id = %request_id, error = ?self, "Request failed");
        }

        // The subscription gate has a fixed, client-recognized body shape
        if matches!(self, AppError::SubscriptionExpired) {
            return (
                status,
                Json(serde_json::json!({
                    "success": false,
                    "subscription_expired": true,
                    "redirect_to": "/membership",
                })),
            )
                .into_response();
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}
