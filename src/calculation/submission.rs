//! Invoice submission.
//!
//! Turns a calculation into an invoice draft after checking the fields the
//! backend would otherwise reject.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationResult, InvoiceDraft, InvoiceSubmission};

/// Validates `submission` against `result` and builds the draft.
///
/// # Errors
///
/// Returns `InvoiceRejected` when the due date is missing, a FixedPrice or
/// Maintenance SOW has no positive manual amount, or no schedule was selected.
pub fn prepare_invoice(
    result: &CalculationResult,
    submission: &InvoiceSubmission,
) -> EngineResult<InvoiceDraft> {
    let reject = |message: String| EngineError::InvoiceRejected { message };

    let due_date = submission
        .due_date
        .ok_or_else(|| reject("a due date is required".to_string()))?;

    for sow in result
        .sows
        .iter()
        .filter(|s| !s.billing_type.is_time_and_materials())
    {
        match sow.manual_amount {
            Some(amount) if amount > Decimal::ZERO => {}
            _ => {
                return Err(reject(format!(
                    "SOW '{}' is {} and needs a positive amount",
                    sow.sow_name,
                    sow.billing_type.as_str()
                )));
            }
        }
    }

    let schedule_ids: Vec<String> = result
        .sows
        .iter()
        .flat_map(|s| s.schedule_ids.iter().cloned())
        .collect();
    if schedule_ids.is_empty() {
        return Err(reject("select at least one invoice schedule".to_string()));
    }

    let draft = InvoiceDraft {
        id: Uuid::new_v4(),
        calculation_id: result.calculation_id,
        sow_ids: result.sows.iter().map(|s| s.sow_id.clone()).collect(),
        schedule_ids,
        currency: result.currency.clone(),
        mode: result.mode,
        due_date,
        amount: result.totals.payable,
        note: submission
            .note
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        created_at: Utc::now(),
    };

    info!(
        invoice_id = %draft.id,
        calculation_id = %draft.calculation_id,
        amount = %draft.amount,
        "Invoice draft prepared"
    );

    Ok(draft)
}
