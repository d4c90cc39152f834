//! Application error taxonomy and HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::repositories::StoreError;
use crate::infrastructure::cache::CacheError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors produced by the URL service and the HTTP boundary.
///
/// Store and cache failures keep their source error so the boundary can log it,
/// while clients only see a stable error code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input rejected at the boundary.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// A caller-supplied short code is already in use.
    #[error("short code '{code}' is already in use")]
    CodeConflict { code: String },

    /// Random generation found no free code within the attempt budget.
    #[error("could not allocate a free short code after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    #[error("short code '{code}' not found")]
    NotFound { code: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn conflict(code: impl Into<String>) -> Self {
        Self::CodeConflict { code: code.into() }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::CodeConflict { .. } | AppError::AllocationExhausted { .. } => {
                StatusCode::CONFLICT
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Converts the error into the client-facing payload.
    ///
    /// Infrastructure details are not exposed.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => {
                ("validation_error", message.clone(), details.clone())
            }
            AppError::CodeConflict { code } => (
                "code_conflict",
                self.to_string(),
                json!({ "short_code": code }),
            ),
            AppError::AllocationExhausted { attempts } => (
                "allocation_exhausted",
                self.to_string(),
                json!({ "attempts": attempts }),
            ),
            AppError::NotFound { code } => (
                "not_found",
                self.to_string(),
                json!({ "short_code": code }),
            ),
            AppError::Store(_) => ("store_error", "Storage unavailable".to_string(), json!({})),
            AppError::Cache(_) => ("cache_error", "Cache unavailable".to_string(), json!({})),
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
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
