//! HTTP error handling and response types.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::StoreError;
use crate::models::{FieldError, ValidationErrors};
use crate::services::{BookingError, ReferenceField};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub detail: String,
    /// Field-level problems, for malformed input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        if !errors.is_empty() {
            self.errors = Some(errors);
        }
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// A referenced service or barber does not exist
    InvalidReference(ReferenceField),
    /// The payload failed shape or format validation
    MalformedInput {
        detail: String,
        errors: Vec<FieldError>,
    },
    /// The barber's slot is already taken
    SlotConflict,
    /// The request body exceeds the router's body limit
    PayloadTooLarge,
    /// The store cannot be reached
    StoreUnavailable,
    /// Any other failure; the message is logged, never returned
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidReference(_) | AppError::MalformedInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::SlotConflict => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::StoreUnavailable | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::InvalidReference(field) => {
                ApiError::new("INVALID_REFERENCE", format!("Invalid {}", field))
            }
            AppError::MalformedInput { detail, errors } => {
                ApiError::new("MALFORMED_INPUT", detail).with_errors(errors)
            }
            AppError::SlotConflict => ApiError::new(
                "SLOT_CONFLICT",
                BookingError::SlotConflict.to_string(),
            ),
            AppError::PayloadTooLarge => {
                ApiError::new("PAYLOAD_TOO_LARGE", "Request body is too large")
            }
            AppError::StoreUnavailable => {
                ApiError::new("STORE_UNAVAILABLE", "Database not available")
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                ApiError::new("INTERNAL_ERROR", "Internal server error")
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            tracing::warn!(error = %err, "Store unavailable");
            AppError::StoreUnavailable
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidReference { field } => AppError::InvalidReference(field),
            BookingError::SlotConflict => AppError::SlotConflict,
            BookingError::Store(e) => e.into(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::MalformedInput {
            detail: err.to_string(),
            errors: err.into_inner(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::MalformedInput {
            detail: rejection.body_text(),
            errors: Vec::new(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedInput {
            detail: rejection.body_text(),
            errors: Vec::new(),
        }
    }
}
