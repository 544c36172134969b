//! Hourly billing.
//!
//! Positions with an hourly rate bill every non-holiday hour logged in the
//! period at that rate.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, BillingLine, RateBasis};

use super::{BillingTarget, WorkSummary, checked};

/// The result of pricing an hourly allocation.
#[derive(Debug, Clone)]
pub struct HourlyBillingResult {
    /// The billed line.
    pub line: BillingLine,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Bills `summary.billable_hours` at `hourly_rate`.
///
/// # Arguments
///
/// * `target` - The allocation and schedule being billed
/// * `summary` - The hours logged in the schedule's period
/// * `hourly_rate` - The position's hourly rate
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns `CalculationError` if the amount overflows.
pub fn calculate_hourly_billing(
    target: &BillingTarget<'_>,
    summary: &WorkSummary,
    hourly_rate: Decimal,
    step_number: u32,
) -> EngineResult<HourlyBillingResult> {
    let amount = checked::product(summary.billable_hours, hourly_rate, "hourly amount")?;

    let line = BillingLine {
        rate: hourly_rate,
        hours: summary.billable_hours,
        amount,
        ..target.empty_line(RateBasis::Hourly)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "hourly_billing".to_string(),
        rule_name: "Hourly Billing".to_string(),
        input: serde_json::json!({
            "allocation_id": target.allocation.id,
            "schedule_id": target.schedule.id,
            "period": target.period().to_string(),
            "hours": summary.billable_hours.normalize().to_string(),
            "hourly_rate": hourly_rate.normalize().to_string(),
            "holidays_excluded": summary.holidays
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} logged {} non-holiday hours at {}/hour = {}",
            target.allocation.employee_name,
            summary.billable_hours.normalize(),
            hourly_rate.normalize(),
            amount.normalize()
        ),
    };

    Ok(HourlyBillingResult { line, audit_step })
}
