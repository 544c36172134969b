//! Core data models for the Invoice Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allocation;
mod billing_period;
mod calculation_result;
mod invoice;
mod merged_sow;
mod sow;

pub use allocation::{ResourceAllocation, TimesheetEntry};
pub use billing_period::BillingPeriod;
pub use calculation_result::{
    AdjustmentLine, AdjustmentSummary, AuditStep, AuditTrace, AuditWarning, BillingLine,
    CalculationMode, CalculationResult, EmployeeTotal, InvoiceTotals, RateBasis, SowBilling,
};
pub use invoice::{InvoiceDraft, InvoiceSubmission};
pub use merged_sow::{MergedSow, merged_position_id};
pub use sow::{BillingType, InvoiceSchedule, ResourcePosition, Sow};
