//! The allocation-in-a-period being priced.

use rust_decimal::Decimal;

use crate::models::{
    BillingLine, BillingPeriod, InvoiceSchedule, RateBasis, ResourceAllocation, ResourcePosition,
};

/// One allocation billed within one invoice schedule.
#[derive(Debug, Clone, Copy)]
pub struct BillingTarget<'a> {
    /// The schedule being invoiced.
    pub schedule: &'a InvoiceSchedule,
    /// The allocation whose time is billed.
    pub allocation: &'a ResourceAllocation,
    /// The position the allocation fills.
    pub position: &'a ResourcePosition,
}

impl BillingTarget<'_> {
    /// The billing window of the schedule.
    pub fn period(&self) -> BillingPeriod {
        self.schedule.period()
    }

    /// A line for this target with every amount zeroed.
    pub(crate) fn empty_line(&self, rate_basis: RateBasis) -> BillingLine {
        BillingLine {
            sow_id: self.schedule.sow_id.clone(),
            schedule_id: self.schedule.id.clone(),
            period: self.period(),
            allocation_id: self.allocation.id.clone(),
            employee_id: self.allocation.employee_id.clone(),
            employee_name: self.allocation.employee_name.clone(),
            position_id: self.position.id.clone(),
            rate_basis,
            rate: Decimal::ZERO,
            hours: Decimal::ZERO,
            months: 0,
            excess_leave_days: 0,
            leave_deduction: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }
}
