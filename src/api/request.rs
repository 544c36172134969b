//! Request types for the Invoice Engine API.
//!
//! This module defines the JSON request structures for the `/calculate`,
//! `/merge` and `/invoices` endpoints.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{BillingData, BillingRequest};
use crate::models::{
    BillingType, CalculationMode, InvoiceSubmission, ResourceAllocation, Sow, TimesheetEntry,
};

/// Request body for the `/calculate` endpoint.
///
/// Carries the SOW records the calculation reads together with the
/// selection to invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// NORMAL or FUTURE.
    #[serde(default)]
    pub mode: CalculationMode,
    /// SOWs invoiced together (the constituents of a merged group).
    pub sow_ids: Vec<String>,
    /// Selected invoice schedules.
    #[serde(default)]
    pub selected_schedule_ids: Vec<String>,
    /// Entered amounts of FixedPrice/Maintenance SOWs, by SOW id.
    #[serde(default)]
    pub manual_amounts: HashMap<String, Decimal>,
    /// SOW definitions.
    pub sows: Vec<SowRequest>,
    /// Resource allocations.
    #[serde(default)]
    pub allocations: Vec<ResourceAllocation>,
    /// Timesheet entries.
    #[serde(default)]
    pub timesheets: Vec<TimesheetEntry>,
}

impl CalculationRequest {
    /// Splits the request into the records read and the selection invoiced.
    pub fn into_parts(self) -> (BillingData, BillingRequest) {
        let data = BillingData {
            sows: self.sows.into_iter().map(Into::into).collect(),
            allocations: self.allocations,
            timesheets: self.timesheets,
        };
        let request = BillingRequest {
            mode: self.mode,
            sow_ids: self.sow_ids,
            schedule_ids: self.selected_schedule_ids,
            manual_amounts: self.manual_amounts,
        };
        (data, request)
    }
}

/// SOW definition in a request.
///
/// Owner ids of schedules and positions are filled in from the SOW.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SowRequest {
    /// Unique identifier for the SOW.
    pub id: String,
    /// The human-readable name of the SOW.
    pub name: String,
    /// How the SOW is invoiced.
    pub billing_type: BillingType,
    /// The owning project.
    pub project_id: String,
    /// The first day of the SOW.
    pub start_date: NaiveDate,
    /// The last day of the SOW.
    pub end_date: NaiveDate,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Invoice schedules ordered by date.
    #[serde(default)]
    pub schedules: Vec<ScheduleRequest>,
    /// Billable positions.
    #[serde(default)]
    pub positions: Vec<PositionRequest>,
}

/// Invoice schedule in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Unique identifier for the schedule.
    pub id: String,
    /// First day of the cycle.
    pub start_date: NaiveDate,
    /// Last day of the cycle.
    pub end_date: NaiveDate,
    /// Whether the cycle was already invoiced.
    #[serde(default)]
    pub billed: bool,
}

/// Resource position in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequest {
    /// Unique identifier for the position.
    pub id: String,
    /// The role name.
    pub name: String,
    /// The hourly rate, if billed by the hour.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// The monthly rate, if billed by the month.
    #[serde(default)]
    pub monthly_rate: Option<Decimal>,
    /// Project reference, defaults to the SOW's project.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl From<SowRequest> for Sow {
    fn from(req: SowRequest) -> Self {
        let sow = Sow::new(
            req.id,
            req.name,
            req.billing_type,
            req.project_id,
            req.start_date,
            req.end_date,
            req.currency,
        );
        let sow = req.schedules.into_iter().fold(sow, |sow, s| {
            sow.with_schedule(s.id, s.start_date, s.end_date, s.billed)
        });
        req.positions.into_iter().fold(sow, |sow, p| {
            let mut sow = sow.with_position(p.id, p.name, p.hourly_rate, p.monthly_rate);
            if let (Some(project_id), Some(position)) = (p.project_id, sow.positions.last_mut()) {
                position.project_id = Some(project_id);
            }
            sow
        })
    }
}

/// Request body for the `/merge` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    /// SOWs to merge.
    pub sow_ids: Vec<String>,
    /// SOW definitions of the workspace.
    pub sows: Vec<SowRequest>,
}

/// Request body for the `/invoices` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// The calculation to invoice.
    pub calculation: CalculationRequest,
    /// When payment is due.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl InvoiceRequest {
    /// The user-entered invoice fields.
    pub fn submission(&self) -> InvoiceSubmission {
        InvoiceSubmission {
            due_date: self.due_date,
            note: self.note.clone(),
        }
    }
}
