//! HTTP API module for the Invoice Engine.
//!
//! This module provides the REST endpoints for calculating invoices,
//! merging SOWs and preparing invoice drafts.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CalculationRequest, InvoiceRequest, MergeRequest, PositionRequest, ScheduleRequest,
    SowRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
