//! Prior-period adjustment for FUTURE billing.
//!
//! When billing in advance, the period immediately before the selection was
//! billed at the plan. Its actual hours are compared with the planned hours
//! and the difference is settled on the new invoice: a positive adjustment is
//! a refund (the client over-paid), a negative one a surcharge.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::BillingPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdjustmentLine, AdjustmentSummary, AuditStep, AuditWarning, InvoiceSchedule,
    ResourceAllocation, Sow, TimesheetEntry,
};

use super::{checked, effective_hourly_rate, summarize_work};

/// The prior-period settlement of one SOW.
#[derive(Debug, Clone)]
pub struct AdjustmentResult {
    /// The settlement.
    pub summary: AdjustmentSummary,
    /// One audit step per settled allocation.
    pub audit_steps: Vec<AuditStep>,
    /// Positions that could not be priced.
    pub warnings: Vec<AuditWarning>,
}

/// Finds the schedule immediately preceding `earliest_selected_start`.
///
/// That is the schedule with the latest end date strictly before the given
/// date. Billed schedules qualify; in practice the previous period usually
/// has been billed already.
pub fn find_previous_schedule(
    sow: &Sow,
    earliest_selected_start: NaiveDate,
) -> Option<&InvoiceSchedule> {
    sow.schedules
        .iter()
        .filter(|s| s.end_date < earliest_selected_start)
        .max_by_key(|s| s.end_date)
}

/// Planned hours of a prior period.
///
/// `max(0, standard_month_hours − (base_allowance + holidays) × hours_per_day)`
///
/// # Example
///
/// ```
/// use invoice_engine::calculation::planned_hours;
/// use invoice_engine::config::BillingPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = BillingPolicy::default();
/// assert_eq!(planned_hours(&policy, 0), Decimal::new(152, 0));
/// assert_eq!(planned_hours(&policy, 1), Decimal::new(144, 0));
/// ```
pub fn planned_hours(policy: &BillingPolicy, holidays: u32) -> Decimal {
    let leave_allowance = Decimal::from(policy.base_leave_allowance_days + holidays);
    let planned = policy.standard_monthly_hours() - leave_allowance * policy.hours_per_workday;
    planned.max(Decimal::ZERO)
}

/// Settles planned versus actual hours for every allocation active in `previous`.
///
/// Allocations whose position has no rate settle at zero and raise a
/// `POSITION_WITHOUT_RATE` warning.
///
/// # Errors
///
/// Returns `InvalidAllocation` if an allocation refers to a position the SOW
/// does not have, and `CalculationError` if an amount overflows.
pub fn calculate_adjustment(
    sow: &Sow,
    previous: &InvoiceSchedule,
    allocations: &[ResourceAllocation],
    timesheets: &[TimesheetEntry],
    policy: &BillingPolicy,
    first_step: u32,
) -> EngineResult<AdjustmentResult> {
    let period = previous.period();
    let mut lines = Vec::new();
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number = first_step;

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

        let work = summarize_work(allocation, timesheets, &period)?;
        let planned = planned_hours(policy, work.holidays);
        let variance = checked::difference(planned, work.billable_hours, "hour variance")?;

        let effective_rate = match effective_hourly_rate(position, policy) {
            Some(rate) => rate,
            None => {
                warn!(
                    sow_id = %sow.id,
                    position_id = %position.id,
                    "Position has no rate; adjustment is zero"
                );
                warnings.push(AuditWarning {
                    code: "POSITION_WITHOUT_RATE".to_string(),
                    message: format!(
                        "Position '{}' on SOW '{}' has no rate; prior-period variance of {} is not settled",
                        position.id, sow.id, allocation.employee_name
                    ),
                    severity: "medium".to_string(),
                });
                Decimal::ZERO
            }
        };
        let adjustment = checked::product(variance, effective_rate, "prior-period adjustment")?;

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "prior_period_adjustment".to_string(),
            rule_name: "Prior Period Adjustment".to_string(),
            input: serde_json::json!({
                "allocation_id": allocation.id,
                "previous_schedule_id": previous.id,
                "period": period.to_string(),
                "holidays": work.holidays,
                "actual_hours": work.billable_hours.normalize().to_string(),
                "effective_rate": effective_rate.normalize().to_string()
            }),
            output: serde_json::json!({
                "planned_hours": planned.normalize().to_string(),
                "variance": variance.normalize().to_string(),
                "adjustment": adjustment.normalize().to_string()
            }),
            reasoning: format!(
                "Planned {} hours ({} leave day(s) allowed), worked {}; variance {} at {}/hour = {} {}",
                planned.normalize(),
                policy.base_leave_allowance_days + work.holidays,
                work.billable_hours.normalize(),
                variance.normalize(),
                effective_rate.normalize(),
                adjustment.normalize(),
                if adjustment >= Decimal::ZERO { "refunded" } else { "surcharged" }
            ),
        });
        step_number += 1;

        lines.push(AdjustmentLine {
            allocation_id: allocation.id.clone(),
            employee_id: allocation.employee_id.clone(),
            employee_name: allocation.employee_name.clone(),
            position_id: position.id.clone(),
            holidays: work.holidays,
            planned_hours: planned,
            actual_hours: work.billable_hours,
            variance,
            effective_rate,
            adjustment,
        });
    }

    let total_adjustment =
        checked::total(lines.iter().map(|l| l.adjustment), "total adjustment")?;

    Ok(AdjustmentResult {
        summary: AdjustmentSummary {
            sow_id: sow.id.clone(),
            previous_schedule_id: previous.id.clone(),
            period,
            lines,
            total_adjustment,
        },
        audit_steps,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn sow() -> Sow {
        Sow::new(
            "sow_001",
            "Platform build",
            BillingType::TimeAndMaterials,
            "prj_001",
            d(1, 1),
            d(12, 31),
            "VND",
        )
        .with_schedule("sch_jan", d(1, 1), d(1, 31), true)
        .with_schedule("sch_feb", d(2, 1), d(2, 28), false)
        .with_schedule("sch_mar", d(3, 1), d(3, 31), false)
        .with_position("pos_dev", "Developer", Some(dec("100")), None)
        .with_position("pos_ba", "Business Analyst", None, Some(dec("2000000")))
        .with_position("pos_intern", "Intern", None, None)
    }

    fn allocation(id: &str, position: &str) -> ResourceAllocation {
        ResourceAllocation {
            id: id.to_string(),
            employee_id: format!("emp_{}", id),
            employee_name: format!("Employee {}", id),
            position_id: position.to_string(),
            sow_id: "sow_001".to_string(),
            start_date: d(1, 1),
            end_date: d(12, 31),
        }
    }

    fn hours_in_january(allocation_id: &str, total: u32, holidays: u32) -> Vec<TimesheetEntry> {
        let mut entries = Vec::new();
        let mut remaining = total;
        let mut day = 2;
        while remaining > 0 {
            let hours = remaining.min(8);
            entries.push(TimesheetEntry {
                id: format!("ts_{}_{}", allocation_id, day),
                allocation_id: allocation_id.to_string(),
                date: d(1, day),
                hours: Decimal::from(hours),
                is_holiday: false,
            });
            remaining -= hours;
            day += 1;
        }
        for h in 0..holidays {
            entries.push(TimesheetEntry {
                id: format!("hol_{}_{}", allocation_id, h),
                allocation_id: allocation_id.to_string(),
                date: d(1, 28 + h),
                hours: Decimal::ZERO,
                is_holiday: true,
            });
        }
        entries
    }

    #[test]
    fn test_previous_schedule_is_latest_ending_before_selection() {
        let sow = sow();
        assert_eq!(find_previous_schedule(&sow, d(3, 1)).unwrap().id, "sch_feb");
        assert_eq!(find_previous_schedule(&sow, d(2, 1)).unwrap().id, "sch_jan");
    }

    #[test]
    fn test_no_previous_schedule_for_first_period() {
        let sow = sow();
        assert!(find_previous_schedule(&sow, d(1, 1)).is_none());
    }

    #[test]
    fn test_planned_hours_never_negative() {
        assert_eq!(planned_hours(&BillingPolicy::default(), 25), Decimal::ZERO);
    }

    #[test]
    fn test_under_delivery_is_refunded() {
        let sow = sow();
        let previous = &sow.schedules[0];
        let allocations = vec![allocation("a1", "pos_dev")];
        let timesheets = hours_in_january("a1", 140, 0);

        let result = calculate_adjustment(
            &sow,
            previous,
            &allocations,
            &timesheets,
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        let line = &result.summary.lines[0];
        assert_eq!(line.planned_hours, dec("152"));
        assert_eq!(line.actual_hours, dec("140"));
        assert_eq!(line.variance, dec("12"));
        assert_eq!(line.adjustment, dec("1200"));
        assert_eq!(result.summary.total_adjustment, dec("1200"));
        assert_eq!(result.summary.previous_schedule_id, "sch_jan");
    }

    #[test]
    fn test_over_delivery_is_surcharged() {
        let sow = sow();
        let allocations = vec![allocation("a1", "pos_dev")];
        let timesheets = hours_in_january("a1", 160, 0);

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &allocations,
            &timesheets,
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        assert_eq!(result.summary.lines[0].variance, dec("-8"));
        assert_eq!(result.summary.total_adjustment, dec("-800"));
        assert!(result.audit_steps[0].reasoning.contains("surcharged"));
    }

    #[test]
    fn test_holiday_reduces_planned_hours() {
        let sow = sow();
        let allocations = vec![allocation("a1", "pos_dev")];
        let timesheets = hours_in_january("a1", 144, 1);

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &allocations,
            &timesheets,
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        let line = &result.summary.lines[0];
        assert_eq!(line.holidays, 1);
        assert_eq!(line.planned_hours, dec("144"));
        assert_eq!(line.adjustment, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_position_uses_rate_over_160_hours() {
        let sow = sow();
        let allocations = vec![allocation("a2", "pos_ba")];
        let timesheets = hours_in_january("a2", 150, 0);

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &allocations,
            &timesheets,
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        let line = &result.summary.lines[0];
        assert_eq!(line.effective_rate, dec("12500"));
        assert_eq!(line.adjustment, dec("25000"));
    }

    #[test]
    fn test_unrated_position_settles_zero_with_warning() {
        let sow = sow();
        let allocations = vec![allocation("a3", "pos_intern")];

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &allocations,
            &[],
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        assert_eq!(result.summary.total_adjustment, Decimal::ZERO);
        assert_eq!(result.warnings[0].code, "POSITION_WITHOUT_RATE");
    }

    #[test]
    fn test_allocation_inactive_in_previous_period_not_settled() {
        let sow = sow();
        let mut late = allocation("a1", "pos_dev");
        late.start_date = d(2, 15);

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &[late],
            &[],
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        assert!(result.summary.lines.is_empty());
        assert_eq!(result.summary.total_adjustment, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_holiday_entries_reduce_plan_once() {
        let sow = sow();
        let allocations = vec![allocation("a1", "pos_dev")];
        let mut timesheets = hours_in_january("a1", 144, 1);
        timesheets.push(TimesheetEntry {
            id: "hol_a1_dup".to_string(),
            allocation_id: "a1".to_string(),
            date: d(1, 28),
            hours: Decimal::ZERO,
            is_holiday: true,
        });

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &allocations,
            &timesheets,
            &BillingPolicy::default(),
            1,
        )
        .unwrap();

        let line = &result.summary.lines[0];
        assert_eq!(line.holidays, 1);
        assert_eq!(line.planned_hours, dec("144"));
    }

    #[test]
    fn test_adjustment_overflow_is_an_error() {
        let sow = sow().with_position("pos_lead", "Lead", Some(Decimal::MAX), None);
        let allocations = vec![allocation("a4", "pos_lead")];

        let result = calculate_adjustment(
            &sow,
            &sow.schedules[0],
            &allocations,
            &[],
            &BillingPolicy::default(),
            1,
        );

        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
