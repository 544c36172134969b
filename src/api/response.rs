//! Response types for the Invoice Engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::ConfigParseError { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration parse error", message),
            ),
            EngineError::SowNotFound { sow_id } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "SOW_NOT_FOUND",
                    message,
                    format!("No SOW with id '{}' was provided in the request", sow_id),
                ),
            ),
            EngineError::InvalidSow { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_SOW",
                    message,
                    "The SOW data contains invalid information",
                ),
            ),
            EngineError::ScheduleNotFound { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "SCHEDULE_NOT_FOUND",
                    message,
                    "Selected schedules must belong to one of the selected SOWs",
                ),
            ),
            EngineError::InvalidAllocation { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_ALLOCATION",
                    message,
                    "The allocation data contains invalid information",
                ),
            ),
            EngineError::InvalidTimesheet { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_TIMESHEET",
                    message,
                    "The timesheet data contains invalid information",
                ),
            ),
            EngineError::MalformedNotification { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::malformed_json(message),
            ),
            EngineError::CalculationError { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("CALCULATION_ERROR", message),
            ),
            EngineError::ScheduleAlreadyBilled { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("SCHEDULE_ALREADY_BILLED", message),
            ),
            EngineError::CurrencyMismatch { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("CURRENCY_MISMATCH", message),
            ),
            EngineError::MergeRejected { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("MERGE_REJECTED", message),
            ),
            EngineError::InvoiceRejected { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVOICE_REJECTED", message),
            ),
            EngineError::PinLimitReached { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("PIN_LIMIT_REACHED", message),
            ),
            EngineError::BackendRejected { status, .. } => ApiErrorResponse::new(
                StatusCode::BAD_GATEWAY,
                ApiError::with_details(
                    "BACKEND_ERROR",
                    message,
                    format!("Backend responded with status {}", status),
                ),
            ),
            EngineError::NotImplemented { .. } => ApiErrorResponse::new(
                StatusCode::NOT_IMPLEMENTED,
                ApiError::new("NOT_IMPLEMENTED", message),
            ),
        }
    }
}
