//! Timesheet aggregation.
//!
//! This module sums the timesheet entries logged against one allocation within
//! a billing period.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{BillingPeriod, ResourceAllocation, TimesheetEntry};

use super::checked;

/// What an allocation logged within one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    /// Sum of non-holiday hours.
    pub billable_hours: Decimal,
    /// Distinct days with non-holiday hours above zero.
    pub worked_days: u32,
    /// Distinct dates marked as holiday.
    pub holidays: u32,
}

/// Aggregates the entries of `allocation` dated within `period`.
///
/// Holiday entries never contribute hours. Several entries on the same date
/// count as one worked day, or as one holiday.
///
/// # Errors
///
/// Returns `CalculationError` if the hours overflow.
///
/// # Example
///
/// ```
/// use invoice_engine::calculation::summarize_work;
/// use invoice_engine::models::{BillingPeriod, ResourceAllocation, TimesheetEntry};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
/// let allocation = ResourceAllocation {
///     id: "alloc_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     employee_name: "Linh Tran".to_string(),
///     position_id: "pos_dev".to_string(),
///     sow_id: "sow_001".to_string(),
///     start_date: d(1),
///     end_date: d(31),
/// };
/// let entries = vec![
///     TimesheetEntry { id: "t1".into(), allocation_id: "alloc_001".into(), date: d(6), hours: Decimal::new(8, 0), is_holiday: false },
///     TimesheetEntry { id: "t2".into(), allocation_id: "alloc_001".into(), date: d(7), hours: Decimal::ZERO, is_holiday: true },
/// ];
///
/// let summary = summarize_work(&allocation, &entries, &BillingPeriod::new(d(1), d(31))).unwrap();
/// assert_eq!(summary.billable_hours, Decimal::new(8, 0));
/// assert_eq!(summary.worked_days, 1);
/// assert_eq!(summary.holidays, 1);
/// ```
pub fn summarize_work(
    allocation: &ResourceAllocation,
    entries: &[TimesheetEntry],
    period: &BillingPeriod,
) -> EngineResult<WorkSummary> {
    let mut hours: Vec<Decimal> = Vec::new();
    let mut worked_dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut holiday_dates: BTreeSet<NaiveDate> = BTreeSet::new();

    for entry in entries
        .iter()
        .filter(|e| e.allocation_id == allocation.id && period.contains_date(e.date))
    {
        if entry.is_holiday {
            holiday_dates.insert(entry.date);
            continue;
        }
        hours.push(entry.billable_hours());
        if entry.hours > Decimal::ZERO {
            worked_dates.insert(entry.date);
        }
    }

    Ok(WorkSummary {
        billable_hours: checked::total(hours, "billable hours")?,
        worked_days: worked_dates.len() as u32,
        holidays: holiday_dates.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn allocation(id: &str) -> ResourceAllocation {
        ResourceAllocation {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            employee_name: "Linh Tran".to_string(),
            position_id: "pos_dev".to_string(),
            sow_id: "sow_001".to_string(),
            start_date: d(1, 1),
            end_date: d(12, 31),
        }
    }

    fn entry(allocation_id: &str, date: NaiveDate, hours: &str, is_holiday: bool) -> TimesheetEntry {
        TimesheetEntry {
            id: format!("ts_{}_{}", allocation_id, date),
            allocation_id: allocation_id.to_string(),
            date,
            hours: hours.parse().unwrap(),
            is_holiday,
        }
    }

    fn january() -> BillingPeriod {
        BillingPeriod::new(d(1, 1), d(1, 31))
    }

    #[test]
    fn test_empty_timesheet_is_zero() {
        let summary = summarize_work(&allocation("a1"), &[], &january()).unwrap();
        assert_eq!(summary, WorkSummary::default());
    }

    #[test]
    fn test_entries_outside_period_ignored() {
        let entries = vec![
            entry("a1", d(1, 31), "8", false),
            entry("a1", d(2, 1), "8", false),
            entry("a1", d(12, 31), "8", false),
        ];
        let summary = summarize_work(&allocation("a1"), &entries, &january()).unwrap();
        assert_eq!(summary.billable_hours, Decimal::new(8, 0));
        assert_eq!(summary.worked_days, 1);
    }

    #[test]
    fn test_entries_of_other_allocations_ignored() {
        let entries = vec![
            entry("a1", d(1, 6), "8", false),
            entry("a2", d(1, 6), "8", false),
        ];
        let summary = summarize_work(&allocation("a1"), &entries, &january()).unwrap();
        assert_eq!(summary.billable_hours, Decimal::new(8, 0));
    }

    #[test]
    fn test_split_entries_on_same_day_count_once() {
        let entries = vec![
            entry("a1", d(1, 6), "4", false),
            entry("a1", d(1, 6), "3.5", false),
        ];
        let summary = summarize_work(&allocation("a1"), &entries, &january()).unwrap();
        assert_eq!(summary.billable_hours, Decimal::new(75, 1));
        assert_eq!(summary.worked_days, 1);
    }

    #[test]
    fn test_zero_hour_workday_is_not_a_worked_day() {
        let entries = vec![entry("a1", d(1, 6), "0", false)];
        let summary = summarize_work(&allocation("a1"), &entries, &january()).unwrap();
        assert_eq!(summary.worked_days, 0);
        assert_eq!(summary.holidays, 0);
    }

    #[test]
    fn test_holidays_counted_not_billed() {
        let entries = vec![
            entry("a1", d(1, 1), "0", true),
            entry("a1", d(1, 2), "8", false),
            entry("a1", d(1, 29), "0", true),
        ];
        let summary = summarize_work(&allocation("a1"), &entries, &january()).unwrap();
        assert_eq!(summary.holidays, 2);
        assert_eq!(summary.billable_hours, Decimal::new(8, 0));
    }

    #[test]
    fn test_duplicate_holiday_entries_count_once() {
        let entries = vec![
            entry("a1", d(1, 29), "0", true),
            entry("a1", d(1, 29), "0", true),
        ];
        let summary = summarize_work(&allocation("a1"), &entries, &january()).unwrap();
        assert_eq!(summary.holidays, 1);
    }

    #[test]
    fn test_hour_overflow_is_an_error() {
        let entries = vec![
            entry("a1", d(1, 6), "79228162514264337593543950335", false),
            entry("a1", d(1, 7), "8", false),
        ];
        assert!(summarize_work(&allocation("a1"), &entries, &january()).is_err());
    }
}
