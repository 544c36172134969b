//! Position rate selection.
//!
//! A position may carry an hourly rate, a monthly rate, both, or neither.
//! The hourly rate always wins when present.

use rust_decimal::Decimal;

use crate::config::BillingPolicy;
use crate::models::{RateBasis, ResourcePosition};

/// The rate a position is billed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionRate {
    /// Billed per logged hour.
    Hourly(Decimal),
    /// Billed per calendar month.
    Monthly(Decimal),
    /// No rate configured.
    Unrated,
}

impl PositionRate {
    /// Selects the rate of a position, preferring the hourly rate.
    pub fn of(position: &ResourcePosition) -> Self {
        match (position.hourly_rate, position.monthly_rate) {
            (Some(hourly), _) => PositionRate::Hourly(hourly),
            (None, Some(monthly)) => PositionRate::Monthly(monthly),
            (None, None) => PositionRate::Unrated,
        }
    }

    /// The basis recorded on billing lines.
    pub fn basis(self) -> RateBasis {
        match self {
            PositionRate::Hourly(_) => RateBasis::Hourly,
            PositionRate::Monthly(_) => RateBasis::Monthly,
            PositionRate::Unrated => RateBasis::Unrated,
        }
    }
}

/// Returns the per-hour value of a position.
///
/// The hourly rate if present, otherwise the monthly rate spread over the
/// standard month (160 hours with the default policy). `None` when the
/// position has no rate.
///
/// # Example
///
/// ```
/// use invoice_engine::calculation::effective_hourly_rate;
/// use invoice_engine::config::BillingPolicy;
/// use invoice_engine::models::ResourcePosition;
/// use rust_decimal::Decimal;
///
/// let position = ResourcePosition {
///     id: "pos_qa".to_string(),
///     name: "QA".to_string(),
///     sow_id: "sow_001".to_string(),
///     hourly_rate: None,
///     monthly_rate: Some(Decimal::new(1_600_000, 0)),
///     project_id: None,
/// };
///
/// let rate = effective_hourly_rate(&position, &BillingPolicy::default());
/// assert_eq!(rate, Some(Decimal::new(10_000, 0)));
/// ```
pub fn effective_hourly_rate(position: &ResourcePosition, policy: &BillingPolicy) -> Option<Decimal> {
    match PositionRate::of(position) {
        PositionRate::Hourly(rate) => Some(rate),
        PositionRate::Monthly(rate) => Some(rate / policy.standard_monthly_hours()),
        PositionRate::Unrated => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(hourly: Option<i64>, monthly: Option<i64>) -> ResourcePosition {
        ResourcePosition {
            id: "pos_001".to_string(),
            name: "Developer".to_string(),
            sow_id: "sow_001".to_string(),
            hourly_rate: hourly.map(|r| Decimal::new(r, 0)),
            monthly_rate: monthly.map(|r| Decimal::new(r, 0)),
            project_id: None,
        }
    }

    #[test]
    fn test_hourly_rate_preferred_over_monthly() {
        let rate = PositionRate::of(&position(Some(100), Some(2_000_000)));
        assert_eq!(rate, PositionRate::Hourly(Decimal::new(100, 0)));
        assert_eq!(rate.basis(), RateBasis::Hourly);
    }

    #[test]
    fn test_monthly_rate_when_no_hourly() {
        let rate = PositionRate::of(&position(None, Some(2_000_000)));
        assert_eq!(rate, PositionRate::Monthly(Decimal::new(2_000_000, 0)));
    }

    #[test]
    fn test_unrated_position() {
        let rate = PositionRate::of(&position(None, None));
        assert_eq!(rate, PositionRate::Unrated);
        assert_eq!(rate.basis(), RateBasis::Unrated);
        assert_eq!(effective_hourly_rate(&position(None, None), &BillingPolicy::default()), None);
    }

    #[test]
    fn test_effective_rate_of_monthly_position_divides_by_160() {
        let rate = effective_hourly_rate(&position(None, Some(2_000_000)), &BillingPolicy::default());
        assert_eq!(rate, Some(Decimal::new(12_500, 0)));
    }

    #[test]
    fn test_effective_rate_of_hourly_position_is_unchanged() {
        let rate = effective_hourly_rate(&position(Some(100), None), &BillingPolicy::default());
        assert_eq!(rate, Some(Decimal::new(100, 0)));
    }
}
