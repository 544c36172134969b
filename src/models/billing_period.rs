//! Billing period model.
//!
//! This module contains the [`BillingPeriod`] type: the inclusive date window
//! of one invoice cycle, with the month-counting rule used by monthly-rate
//! positions.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Represents an inclusive billing window.
///
/// # Example
///
/// ```
/// use invoice_engine::models::BillingPeriod;
/// use chrono::NaiveDate;
///
/// let period = BillingPeriod {
///     start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()));
/// assert_eq!(period.months_spanned(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
}

impl BillingPeriod {
    /// Creates a period from its bounds.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Checks if a given date falls within this period.
    ///
    /// The check is inclusive of both start and end dates.
    ///
    /// # Example
    ///
    /// ```
    /// use invoice_engine::models::BillingPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = BillingPeriod::new(
    ///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    /// );
    ///
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())); // start date
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())); // end date
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())); // after
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Checks if the inclusive range `[start, end]` intersects this period.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && end >= self.start_date
    }

    /// Counts the calendar months this period is billed for.
    ///
    /// Whole months between the start and end month are counted, plus one
    /// more when the end day-of-month is on or after the start day-of-month.
    /// Partial months are never prorated by day count.
    ///
    /// # Example
    ///
    /// ```
    /// use invoice_engine::models::BillingPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// assert_eq!(BillingPeriod::new(d(2025, 1, 1), d(2025, 1, 31)).months_spanned(), 1);
    /// assert_eq!(BillingPeriod::new(d(2025, 1, 1), d(2025, 3, 31)).months_spanned(), 3);
    /// assert_eq!(BillingPeriod::new(d(2025, 1, 15), d(2025, 2, 14)).months_spanned(), 1);
    /// assert_eq!(BillingPeriod::new(d(2025, 1, 15), d(2025, 2, 15)).months_spanned(), 2);
    /// ```
    pub fn months_spanned(&self) -> u32 {
        let whole_months = (self.end_date.year() - self.start_date.year()) * 12
            + self.end_date.month() as i32
            - self.start_date.month() as i32;
        let trailing = i32::from(self.end_date.day() >= self.start_date.day());

        (whole_months + trailing).max(0) as u32
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contains_date_within_period() {
        let period = BillingPeriod::new(d(2025, 1, 1), d(2025, 1, 31));
        assert!(period.contains_date(d(2025, 1, 15)));
    }

    #[test]
    fn test_contains_date_outside_period() {
        let period = BillingPeriod::new(d(2025, 1, 1), d(2025, 1, 31));
        assert!(!period.contains_date(d(2024, 12, 31)));
        assert!(!period.contains_date(d(2025, 2, 1)));
    }

    #[test]
    fn test_overlaps_partial_range() {
        let period = BillingPeriod::new(d(2025, 1, 1), d(2025, 1, 31));
        assert!(period.overlaps(d(2024, 12, 15), d(2025, 1, 1)));
        assert!(period.overlaps(d(2025, 1, 31), d(2025, 3, 1)));
        assert!(period.overlaps(d(2024, 1, 1), d(2026, 1, 1)));
    }

    #[test]
    fn test_overlaps_disjoint_range() {
        let period = BillingPeriod::new(d(2025, 1, 1), d(2025, 1, 31));
        assert!(!period.overlaps(d(2024, 12, 1), d(2024, 12, 31)));
        assert!(!period.overlaps(d(2025, 2, 1), d(2025, 2, 28)));
    }

    #[test]
    fn test_months_full_february() {
        let period = BillingPeriod::new(d(2025, 2, 1), d(2025, 2, 28));
        assert_eq!(period.months_spanned(), 1);
    }

    #[test]
    fn test_months_trailing_partial_month_not_counted() {
        // End day 27 is before start day 28, so February is not counted again.
        let period = BillingPeriod::new(d(2025, 1, 28), d(2025, 2, 27));
        assert_eq!(period.months_spanned(), 1);
    }

    #[test]
    fn test_months_across_year_boundary() {
        let period = BillingPeriod::new(d(2024, 11, 1), d(2025, 1, 31));
        assert_eq!(period.months_spanned(), 3);
    }

    #[test]
    fn test_months_mid_month_start_counts_short_period_as_one() {
        let period = BillingPeriod::new(d(2025, 1, 20), d(2025, 1, 31));
        assert_eq!(period.months_spanned(), 1);
    }

    #[test]
    fn test_months_never_negative_for_inverted_range() {
        let period = BillingPeriod::new(d(2025, 3, 10), d(2025, 1, 5));
        assert_eq!(period.months_spanned(), 0);
    }

    #[test]
    fn test_display_format() {
        let period = BillingPeriod::new(d(2025, 1, 1), d(2025, 1, 31));
        assert_eq!(period.to_string(), "2025-01-01 to 2025-01-31");
    }

    #[test]
    fn test_deserialize_billing_period() {
        let json = r#"{ "start_date": "2025-01-01", "end_date": "2025-01-31" }"#;
        let period: BillingPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(period.start_date, d(2025, 1, 1));
        assert_eq!(period.end_date, d(2025, 1, 31));
    }
}
