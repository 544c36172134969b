//! Invoice submission models.
//!
//! An [`InvoiceSubmission`] carries the fields the user enters when issuing an
//! invoice from a calculation; a validated submission becomes an [`InvoiceDraft`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CalculationMode;

/// User-entered fields of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSubmission {
    /// When payment is due. Required.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Free-text note printed on the invoice.
    #[serde(default)]
    pub note: Option<String>,
}

/// A validated invoice ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Unique identifier for the draft.
    pub id: Uuid,
    /// The calculation the draft was issued from.
    pub calculation_id: Uuid,
    /// The SOWs invoiced.
    pub sow_ids: Vec<String>,
    /// The schedules invoiced.
    pub schedule_ids: Vec<String>,
    /// The invoice currency.
    pub currency: String,
    /// The calculation mode used.
    pub mode: CalculationMode,
    /// When payment is due.
    pub due_date: NaiveDate,
    /// The payable amount.
    pub amount: Decimal,
    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the draft was created.
    pub created_at: DateTime<Utc>,
}
