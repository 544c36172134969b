//! Calculation result models for the Invoice Engine.
//!
//! This module contains the [`CalculationResult`] type and its associated structures
//! that capture all outputs from an invoice calculation, including billing lines,
//! prior-period adjustments, totals, and audit traces.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BillingPeriod, BillingType};

/// How the selected periods are billed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalculationMode {
    /// Bill exactly the selected periods.
    #[default]
    Normal,
    /// Bill the selected periods and settle the variance of the prior period.
    Future,
}

/// Which rate a billing line was priced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// Hours multiplied by an hourly rate.
    Hourly,
    /// Months multiplied by a monthly rate, less excess leave.
    Monthly,
    /// The position carries no rate; the line bills nothing.
    Unrated,
}

/// The billed amount for one allocation in one period.
///
/// # Example
///
/// ```
/// use invoice_engine::models::{BillingLine, BillingPeriod, RateBasis};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let line = BillingLine {
///     sow_id: "sow_001".to_string(),
///     schedule_id: "sch_01".to_string(),
///     period: BillingPeriod::new(
///         NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
///     ),
///     allocation_id: "alloc_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     employee_name: "Linh Tran".to_string(),
///     position_id: "pos_dev".to_string(),
///     rate_basis: RateBasis::Hourly,
///     rate: Decimal::new(120000, 0),
///     hours: Decimal::new(160, 0),
///     months: 1,
///     excess_leave_days: 0,
///     leave_deduction: Decimal::ZERO,
///     amount: Decimal::new(19_200_000, 0),
/// };
/// assert_eq!(line.hours * line.rate, line.amount);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingLine {
    /// The SOW billed.
    pub sow_id: String,
    /// The invoice schedule the line belongs to.
    pub schedule_id: String,
    /// The billing window.
    pub period: BillingPeriod,
    /// The allocation the hours were logged against.
    pub allocation_id: String,
    /// The employee billed.
    pub employee_id: String,
    /// Display name of the employee.
    pub employee_name: String,
    /// The position the employee filled.
    pub position_id: String,
    /// Which rate priced this line.
    pub rate_basis: RateBasis,
    /// The hourly or monthly rate applied.
    pub rate: Decimal,
    /// Non-holiday hours logged in the period.
    pub hours: Decimal,
    /// Calendar months billed (monthly positions).
    pub months: u32,
    /// Leave days taken beyond the allowance (monthly positions).
    pub excess_leave_days: u32,
    /// Amount deducted for excess leave.
    pub leave_deduction: Decimal,
    /// The billed amount.
    pub amount: Decimal,
}

/// Per-employee aggregate across all lines of a SOW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeTotal {
    /// The employee.
    pub employee_id: String,
    /// Display name of the employee.
    pub employee_name: String,
    /// Total non-holiday hours billed.
    pub hours: Decimal,
    /// Total amount billed.
    pub amount: Decimal,
}

/// The billing breakdown of one SOW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SowBilling {
    /// The SOW billed.
    pub sow_id: String,
    /// The SOW name.
    pub sow_name: String,
    /// The SOW billing type.
    pub billing_type: BillingType,
    /// The schedules billed, in date order.
    pub schedule_ids: Vec<String>,
    /// Timesheet-derived lines (T&M only).
    pub lines: Vec<BillingLine>,
    /// Lines aggregated per employee (T&M only).
    pub employee_totals: Vec<EmployeeTotal>,
    /// The manually entered amount (FixedPrice/Maintenance only).
    pub manual_amount: Option<Decimal>,
    /// The SOW total before adjustments.
    pub subtotal: Decimal,
}

/// Planned-versus-actual settlement for one allocation in the prior period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// The allocation settled.
    pub allocation_id: String,
    /// The employee settled.
    pub employee_id: String,
    /// Display name of the employee.
    pub employee_name: String,
    /// The position the employee filled.
    pub position_id: String,
    /// Holidays taken in the prior period.
    pub holidays: u32,
    /// Expected hours after the leave allowance.
    pub planned_hours: Decimal,
    /// Non-holiday hours actually logged.
    pub actual_hours: Decimal,
    /// Planned minus actual hours.
    pub variance: Decimal,
    /// Hourly rate, or monthly rate spread over the standard month.
    pub effective_rate: Decimal,
    /// Variance times rate: positive refunds, negative surcharges.
    pub adjustment: Decimal,
}

/// The prior-period settlement of one SOW in FUTURE mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    /// The SOW settled.
    pub sow_id: String,
    /// The schedule the variance was measured over.
    pub previous_schedule_id: String,
    /// The prior billing window.
    pub period: BillingPeriod,
    /// Per-allocation settlements.
    pub lines: Vec<AdjustmentLine>,
    /// Sum of the line adjustments.
    pub total_adjustment: Decimal,
}

/// Aggregated totals for an invoice calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of all SOW subtotals.
    pub base_total: Decimal,
    /// Sum of all prior-period adjustments (zero in NORMAL mode).
    pub total_adjustment: Decimal,
    /// `base_total - total_adjustment`.
    pub payable: Decimal,
    /// Total non-holiday hours billed.
    pub total_hours: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of an invoice calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The calculation mode.
    pub mode: CalculationMode,
    /// The currency every amount is expressed in.
    pub currency: String,
    /// Per-SOW breakdown (constituents listed separately for merged SOWs).
    pub sows: Vec<SowBilling>,
    /// Prior-period settlements; empty when none apply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<AdjustmentSummary>,
    /// Aggregated totals.
    pub totals: InvoiceTotals,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// Returns the breakdown for one SOW.
    pub fn sow(&self, sow_id: &str) -> Option<&SowBilling> {
        self.sows.iter().find(|s| s.sow_id == sow_id)
    }
}
