//! Monthly billing with excess-leave deduction.
//!
//! A monthly position bills its rate for every month the period spans. Every
//! billed month expects a standard number of workdays; days missing beyond the
//! per-month leave allowance and the recorded holidays are deducted at the
//! daily rate.

use rust_decimal::Decimal;

use crate::config::BillingPolicy;
use crate::error::EngineResult;
use crate::models::{AuditStep, BillingLine, RateBasis};

use super::{BillingTarget, WorkSummary, checked};

/// The result of pricing a monthly allocation.
#[derive(Debug, Clone)]
pub struct MonthlyBillingResult {
    /// The billed line.
    pub line: BillingLine,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Counts leave days taken beyond the allowance.
///
/// `max(0, workdays × months − worked_days − (allowed × months + holidays))`
///
/// # Example
///
/// ```
/// use invoice_engine::calculation::{WorkSummary, excess_leave_days};
/// use invoice_engine::config::BillingPolicy;
/// use rust_decimal::Decimal;
///
/// let summary = WorkSummary { billable_hours: Decimal::new(136, 0), worked_days: 17, holidays: 0 };
/// // 20 - 17 - 1 = 2 days over the allowance
/// assert_eq!(excess_leave_days(&BillingPolicy::default(), 1, &summary), 2);
/// ```
pub fn excess_leave_days(policy: &BillingPolicy, months: u32, summary: &WorkSummary) -> u32 {
    let standard_days = policy.workdays_per_month * months;
    let allowed_leave = policy.allowed_leave_days_per_month * months + summary.holidays;

    standard_days
        .saturating_sub(summary.worked_days)
        .saturating_sub(allowed_leave)
}

/// Bills `monthly_rate` for each month of the target period, less excess leave.
///
/// # Arguments
///
/// * `target` - The allocation and schedule being billed
/// * `summary` - What the allocation logged in the schedule's period
/// * `monthly_rate` - The position's monthly rate
/// * `policy` - Workdays per month and leave allowance
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns `CalculationError` if the amount overflows.
pub fn calculate_monthly_billing(
    target: &BillingTarget<'_>,
    summary: &WorkSummary,
    monthly_rate: Decimal,
    policy: &BillingPolicy,
    step_number: u32,
) -> EngineResult<MonthlyBillingResult> {
    let months = target.period().months_spanned();
    let excess_days = excess_leave_days(policy, months, summary);
    let daily_rate = policy.daily_rate(monthly_rate);
    let gross = checked::product(monthly_rate, Decimal::from(months), "monthly amount")?;
    let leave_deduction =
        checked::product(Decimal::from(excess_days), daily_rate, "leave deduction")?;
    let amount = checked::difference(gross, leave_deduction, "monthly amount")?;

    let line = BillingLine {
        rate: monthly_rate,
        hours: summary.billable_hours,
        months,
        excess_leave_days: excess_days,
        leave_deduction,
        amount,
        ..target.empty_line(RateBasis::Monthly)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "monthly_billing".to_string(),
        rule_name: "Monthly Billing".to_string(),
        input: serde_json::json!({
            "allocation_id": target.allocation.id,
            "schedule_id": target.schedule.id,
            "period": target.period().to_string(),
            "monthly_rate": monthly_rate.normalize().to_string(),
            "worked_days": summary.worked_days,
            "holidays": summary.holidays
        }),
        output: serde_json::json!({
            "months": months,
            "excess_leave_days": excess_days,
            "daily_rate": daily_rate.normalize().to_string(),
            "leave_deduction": leave_deduction.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} month(s) at {} = {}; {} excess leave day(s) at {}/day deducted = {}",
            months,
            monthly_rate.normalize(),
            gross.normalize(),
            excess_days,
            daily_rate.normalize(),
            amount.normalize()
        ),
    };

    Ok(MonthlyBillingResult { line, audit_step })
}
