//! Calculation logic for the Invoice Engine.
//!
//! This module contains the billing functions: timesheet aggregation, rate
//! selection, hourly and monthly billing with excess-leave deduction,
//! fixed-price billing, prior-period adjustment for FUTURE mode, SOW merging,
//! the invoice calculator and invoice submission.

mod adjustment;
mod calculator;
mod checked;
mod fixed_price;
mod hourly_billing;
mod merge;
mod monthly_billing;
mod rates;
mod submission;
mod target;
mod time_and_materials;
mod work_hours;

pub use adjustment::{AdjustmentResult, calculate_adjustment, find_previous_schedule, planned_hours};
pub use calculator::{BillingData, BillingRequest, calculate_invoice};
pub use fixed_price::{FixedPriceResult, calculate_fixed_price};
pub use hourly_billing::{HourlyBillingResult, calculate_hourly_billing};
pub use merge::{BillingWorkspace, WorkspaceEntry, merge_sows};
pub use monthly_billing::{MonthlyBillingResult, calculate_monthly_billing, excess_leave_days};
pub use rates::{PositionRate, effective_hourly_rate};
pub use submission::prepare_invoice;
pub use target::BillingTarget;
pub use time_and_materials::{
    TimeAndMaterialsResult, calculate_time_and_materials, employee_totals,
};
pub use work_hours::{WorkSummary, summarize_work};
