//! HTTP request handlers for the Invoice Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{BillingWorkspace, calculate_invoice, prepare_invoice};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationResult, InvoiceDraft, MergedSow, Sow};

use super::request::{CalculationRequest, InvoiceRequest, MergeRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/merge", post(merge_handler))
        .route("/invoices", post(create_invoice_handler).get(list_invoices_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns the calculated invoice.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_calculation(request, &state) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.calculation_id,
                sow_count = result.sows.len(),
                payable = %result.totals.payable,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, &result)
        }
        Err(err) => error_response(correlation_id, "Calculation failed", err),
    }
}

/// Handler for POST /merge endpoint.
///
/// Merges the selected SOWs of the submitted workspace.
async fn merge_handler(payload: Result<Json<MergeRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing merge request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match perform_merge(request) {
        Ok(merged) => {
            info!(
                correlation_id = %correlation_id,
                merged_id = %merged.id,
                schedules = merged.schedules.len(),
                "Merge completed successfully"
            );
            json_response(StatusCode::OK, &merged)
        }
        Err(err) => error_response(correlation_id, "Merge rejected", err),
    }
}

/// Handler for POST /invoices endpoint.
///
/// Recalculates the submitted selection and returns the invoice draft.
async fn create_invoice_handler(
    State(state): State<AppState>,
    payload: Result<Json<InvoiceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing invoice request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match perform_invoice(request, &state) {
        Ok(draft) => {
            info!(
                correlation_id = %correlation_id,
                invoice_id = %draft.id,
                amount = %draft.amount,
                due_date = %draft.due_date,
                "Invoice draft created"
            );
            json_response(StatusCode::CREATED, &draft)
        }
        Err(err) => error_response(correlation_id, "Invoice rejected", err),
    }
}

/// Handler for GET /invoices endpoint.
///
/// Invoice listing has no backing store; the endpoint says so instead of
/// answering with placeholder data.
async fn list_invoices_handler() -> Response {
    let correlation_id = Uuid::new_v4();
    error_response(
        correlation_id,
        "Invoice listing requested",
        EngineError::NotImplemented {
            feature: "invoice listing".to_string(),
        },
    )
}

fn perform_calculation(request: CalculationRequest, state: &AppState) -> EngineResult<CalculationResult> {
    let (data, billing_request) = request.into_parts();
    calculate_invoice(&data, &billing_request, state.config().policy())
}

fn perform_merge(request: MergeRequest) -> EngineResult<MergedSow> {
    let sows: Vec<Sow> = request.sows.into_iter().map(Into::into).collect();
    for sow in &sows {
        sow.validate()?;
    }

    let mut workspace = BillingWorkspace::new(sows);
    let ids: Vec<&str> = request.sow_ids.iter().map(String::as_str).collect();
    let merged = workspace.merge(&ids)?;
    Ok(merged.clone())
}

fn perform_invoice(request: InvoiceRequest, state: &AppState) -> EngineResult<InvoiceDraft> {
    let submission = request.submission();
    let result = perform_calculation(request.calculation, state)?;
    prepare_invoice(&result, &submission)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, context: &str, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "{}", context
    );
    ApiErrorResponse::from(err).into_response()
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response()
}
