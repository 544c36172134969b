//! Resource allocation and timesheet models.
//!
//! An allocation assigns an employee to a position on a SOW for an inclusive
//! date range; timesheet entries record the hours logged against it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::BillingPeriod;

/// Assignment of an employee to a position for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    /// Unique identifier for the allocation.
    pub id: String,
    /// The allocated employee.
    pub employee_id: String,
    /// Display name of the employee.
    #[serde(default)]
    pub employee_name: String,
    /// The position the employee fills.
    pub position_id: String,
    /// The SOW the position belongs to.
    pub sow_id: String,
    /// First allocated day (inclusive).
    pub start_date: NaiveDate,
    /// Last allocated day (inclusive).
    pub end_date: NaiveDate,
}

impl ResourceAllocation {
    /// Returns true if the allocation is active at any point in the period.
    pub fn overlaps(&self, period: &BillingPeriod) -> bool {
        period.overlaps(self.start_date, self.end_date)
    }

    /// Checks that the allocation range is ordered.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start_date > self.end_date {
            return Err(EngineError::InvalidAllocation {
                allocation_id: self.id.clone(),
                message: format!(
                    "start date {} is after end date {}",
                    self.start_date, self.end_date
                ),
            });
        }
        Ok(())
    }
}

/// Hours logged by an employee against an allocation on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The allocation the hours were logged against.
    pub allocation_id: String,
    /// The day worked.
    pub date: NaiveDate,
    /// Hours worked (0 on holidays).
    pub hours: Decimal,
    /// Whether the day was taken as a holiday.
    #[serde(default)]
    pub is_holiday: bool,
}

impl TimesheetEntry {
    /// Hours that count towards billing: zero for holiday entries.
    pub fn billable_hours(&self) -> Decimal {
        if self.is_holiday {
            Decimal::ZERO
        } else {
            self.hours
        }
    }

    /// Checks that hours are non-negative and holidays carry no hours.
    pub fn validate(&self) -> EngineResult<()> {
        if self.hours < Decimal::ZERO {
            return Err(EngineError::InvalidTimesheet {
                entry_id: self.id.clone(),
                message: "hours must not be negative".to_string(),
            });
        }
        if self.is_holiday && !self.hours.is_zero() {
            return Err(EngineError::InvalidTimesheet {
                entry_id: self.id.clone(),
                message: format!("holiday entry carries {} hours", self.hours.normalize()),
            });
        }
        Ok(())
    }
}
