//! Statement-of-Work model and related types.
//!
//! This module defines the [`Sow`] struct together with its billing type,
//! resource positions and invoice schedules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::BillingPeriod;

/// How a SOW is invoiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingType {
    /// Payment is computed from the hours actually worked.
    TimeAndMaterials,
    /// A manually specified flat amount per cycle.
    FixedPrice,
    /// A manually specified flat maintenance fee per cycle.
    Maintenance,
}

impl BillingType {
    /// Returns true if invoices for this billing type are derived from timesheets.
    pub fn is_time_and_materials(self) -> bool {
        self == BillingType::TimeAndMaterials
    }

    /// Returns the wire name of the billing type.
    pub fn as_str(self) -> &'static str {
        match self {
            BillingType::TimeAndMaterials => "time_and_materials",
            BillingType::FixedPrice => "fixed_price",
            BillingType::Maintenance => "maintenance",
        }
    }
}

/// A billable role on a SOW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePosition {
    /// Unique identifier for the position.
    pub id: String,
    /// The human-readable role name (e.g., "Senior Developer").
    pub name: String,
    /// The SOW this position belongs to.
    pub sow_id: String,
    /// The hourly rate, if billed by the hour.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// The monthly rate, if billed by the month.
    #[serde(default)]
    pub monthly_rate: Option<Decimal>,
    /// Optional project reference.
    #[serde(default)]
    pub project_id: Option<String>,
}

/// A billing cycle boundary on a SOW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSchedule {
    /// Unique identifier for the schedule.
    pub id: String,
    /// The SOW this schedule belongs to.
    pub sow_id: String,
    /// The first day of the cycle (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the cycle (inclusive).
    pub end_date: NaiveDate,
    /// Whether this cycle has already been invoiced.
    #[serde(default)]
    pub billed: bool,
}

impl InvoiceSchedule {
    /// Returns the billing window of this schedule.
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod::new(self.start_date, self.end_date)
    }
}

/// A Statement of Work.
///
/// The billing type is fixed at construction and can only be read afterwards.
///
/// # Example
///
/// ```
/// use invoice_engine::models::{BillingType, Sow};
/// use chrono::NaiveDate;
///
/// let sow = Sow::new(
///     "sow_001",
///     "Platform build",
///     BillingType::TimeAndMaterials,
///     "prj_001",
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
///     "VND",
/// );
/// assert!(sow.billing_type().is_time_and_materials());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sow {
    /// Unique identifier for the SOW.
    pub id: String,
    /// The human-readable name of the SOW.
    pub name: String,
    billing_type: BillingType,
    /// The project this SOW belongs to.
    pub project_id: String,
    /// The first day of the SOW.
    pub start_date: NaiveDate,
    /// The last day of the SOW.
    pub end_date: NaiveDate,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Invoice schedules ordered by date.
    #[serde(default)]
    pub schedules: Vec<InvoiceSchedule>,
    /// Billable positions on this SOW.
    #[serde(default)]
    pub positions: Vec<ResourcePosition>,
}

impl Sow {
    /// Creates a SOW without schedules or positions.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        billing_type: BillingType,
        project_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            billing_type,
            project_id: project_id.into(),
            start_date,
            end_date,
            currency: currency.into(),
            schedules: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Appends an invoice schedule owned by this SOW.
    pub fn with_schedule(
        mut self,
        id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        billed: bool,
    ) -> Self {
        self.schedules.push(InvoiceSchedule {
            id: id.into(),
            sow_id: self.id.clone(),
            start_date,
            end_date,
            billed,
        });
        self
    }

    /// Appends a resource position owned by this SOW.
    pub fn with_position(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        hourly_rate: Option<Decimal>,
        monthly_rate: Option<Decimal>,
    ) -> Self {
        self.positions.push(ResourcePosition {
            id: id.into(),
            name: name.into(),
            sow_id: self.id.clone(),
            hourly_rate,
            monthly_rate,
            project_id: Some(self.project_id.clone()),
        });
        self
    }

    /// Returns the billing type of the SOW.
    pub fn billing_type(&self) -> BillingType {
        self.billing_type
    }

    /// Finds a position by id.
    pub fn position(&self, position_id: &str) -> Option<&ResourcePosition> {
        self.positions.iter().find(|p| p.id == position_id)
    }

    /// Finds a schedule by id.
    pub fn schedule(&self, schedule_id: &str) -> Option<&InvoiceSchedule> {
        self.schedules.iter().find(|s| s.id == schedule_id)
    }

    /// Returns the schedules that can still be selected for billing.
    pub fn unbilled_schedules(&self) -> impl Iterator<Item = &InvoiceSchedule> {
        self.schedules.iter().filter(|s| !s.billed)
    }

    /// Validates the structural invariants of the SOW.
    ///
    /// Checks that date ranges are ordered, schedules are ordered and do not
    /// overlap, owned records point back at this SOW, and rates are not negative.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidSow {
            sow_id: self.id.clone(),
            message,
        };

        if self.start_date > self.end_date {
            return Err(invalid(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }

        for schedule in &self.schedules {
            if schedule.sow_id != self.id {
                return Err(invalid(format!(
                    "schedule '{}' belongs to SOW '{}'",
                    schedule.id, schedule.sow_id
                )));
            }
            if schedule.start_date > schedule.end_date {
                return Err(invalid(format!(
                    "schedule '{}' starts after it ends",
                    schedule.id
                )));
            }
        }

        for pair in self.schedules.windows(2) {
            if pair[1].start_date <= pair[0].end_date {
                return Err(invalid(format!(
                    "schedules '{}' and '{}' overlap or are out of order",
                    pair[0].id, pair[1].id
                )));
            }
        }

        for position in &self.positions {
            if position.sow_id != self.id {
                return Err(invalid(format!(
                    "position '{}' belongs to SOW '{}'",
                    position.id, position.sow_id
                )));
            }
            let negative = [position.hourly_rate, position.monthly_rate]
                .into_iter()
                .flatten()
                .any(|rate| rate < Decimal::ZERO);
            if negative {
                return Err(invalid(format!(
                    "position '{}' has a negative rate",
                    position.id
                )));
            }
        }

        Ok(())
    }
}
