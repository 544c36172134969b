//! Time & Materials SOW billing.
//!
//! Every allocation of the SOW that is active in a selected schedule gets one
//! line per schedule, priced by the position's rate.

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::BillingPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, BillingLine, EmployeeTotal, InvoiceSchedule, RateBasis,
    ResourceAllocation, Sow, SowBilling, TimesheetEntry,
};

use super::{
    BillingTarget, PositionRate, calculate_hourly_billing, calculate_monthly_billing, checked,
    summarize_work,
};

/// The billing of one T&M SOW.
#[derive(Debug, Clone)]
pub struct TimeAndMaterialsResult {
    /// The SOW breakdown.
    pub billing: SowBilling,
    /// One audit step per priced line.
    pub audit_steps: Vec<AuditStep>,
    /// Positions that could not be priced.
    pub warnings: Vec<AuditWarning>,
}

/// Bills the selected schedules of a T&M SOW from its timesheets.
///
/// Allocations of other SOWs and allocations inactive during a schedule are
/// skipped. Step numbers are assigned consecutively from `first_step`.
///
/// # Errors
///
/// Returns `InvalidAllocation` if an allocation refers to a position the SOW
/// does not have, and `CalculationError` if an amount overflows.
pub fn calculate_time_and_materials(
    sow: &Sow,
    schedules: &[&InvoiceSchedule],
    allocations: &[ResourceAllocation],
    timesheets: &[TimesheetEntry],
    policy: &BillingPolicy,
    first_step: u32,
) -> EngineResult<TimeAndMaterialsResult> {
    let mut lines = Vec::new();
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number = first_step;

    for schedule in schedules {
        let period = schedule.period();

        for allocation in allocations
            .iter()
            .filter(|a| a.sow_id == sow.id && a.overlaps(&period))
        {
            let position = sow.position(&allocation.position_id).ok_or_else(|| {
                EngineError::InvalidAllocation {
                    allocation_id: allocation.id.clone(),
                    message: format!(
                        "position '{}' does not exist on SOW '{}'",
                        allocation.position_id, sow.id
                    ),
                }
            })?;

            let target = BillingTarget {
                schedule,
                allocation,
                position,
            };
            let summary = summarize_work(allocation, timesheets, &period)?;

            let (line, step) = match PositionRate::of(position) {
                PositionRate::Hourly(rate) => {
                    let result = calculate_hourly_billing(&target, &summary, rate, step_number)?;
                    (result.line, result.audit_step)
                }
                PositionRate::Monthly(rate) => {
                    let result =
                        calculate_monthly_billing(&target, &summary, rate, policy, step_number)?;
                    (result.line, result.audit_step)
                }
                PositionRate::Unrated => {
                    warn!(
                        sow_id = %sow.id,
                        position_id = %position.id,
                        "Position has no rate; billing zero"
                    );
                    warnings.push(AuditWarning {
                        code: "POSITION_WITHOUT_RATE".to_string(),
                        message: format!(
                            "Position '{}' on SOW '{}' has neither an hourly nor a monthly rate; {} is billed 0",
                            position.id, sow.id, allocation.employee_name
                        ),
                        severity: "medium".to_string(),
                    });
                    unrated_line(&target, &summary, step_number)
                }
            };

            lines.push(line);
            audit_steps.push(step);
            step_number += 1;
        }
    }

    let subtotal = checked::total(lines.iter().map(|l| l.amount), "SOW subtotal")?;
    let employee_totals = employee_totals(&lines)?;

    Ok(TimeAndMaterialsResult {
        billing: SowBilling {
            sow_id: sow.id.clone(),
            sow_name: sow.name.clone(),
            billing_type: sow.billing_type(),
            schedule_ids: schedules.iter().map(|s| s.id.clone()).collect(),
            lines,
            employee_totals,
            manual_amount: None,
            subtotal,
        },
        audit_steps,
        warnings,
    })
}

fn unrated_line(
    target: &BillingTarget<'_>,
    summary: &super::WorkSummary,
    step_number: u32,
) -> (BillingLine, AuditStep) {
    let line = BillingLine {
        hours: summary.billable_hours,
        ..target.empty_line(RateBasis::Unrated)
    };
    let step = AuditStep {
        step_number,
        rule_id: "unrated_position".to_string(),
        rule_name: "Unrated Position".to_string(),
        input: serde_json::json!({
            "allocation_id": target.allocation.id,
            "schedule_id": target.schedule.id,
            "position_id": target.position.id,
            "hours": summary.billable_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": "0"
        }),
        reasoning: format!(
            "Position '{}' has no rate; {} hours billed at 0",
            target.position.id,
            summary.billable_hours.normalize()
        ),
    };
    (line, step)
}

/// Aggregates lines per employee, in order of first appearance.
///
/// # Errors
///
/// Returns `CalculationError` if a total overflows.
pub fn employee_totals(lines: &[BillingLine]) -> EngineResult<Vec<EmployeeTotal>> {
    let mut totals: Vec<EmployeeTotal> = Vec::new();

    for line in lines {
        match totals.iter_mut().find(|t| t.employee_id == line.employee_id) {
            Some(total) => {
                total.hours = checked::total([total.hours, line.hours], "employee hours")?;
                total.amount = checked::total([total.amount, line.amount], "employee amount")?;
            }
            None => totals.push(EmployeeTotal {
                employee_id: line.employee_id.clone(),
                employee_name: line.employee_name.clone(),
                hours: line.hours,
                amount: line.amount,
            }),
        }
    }

    Ok(totals)
}
