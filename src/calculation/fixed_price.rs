//! Fixed-price and maintenance SOW billing.
//!
//! These SOWs bill a manually entered amount per cycle. Timesheets are never
//! consulted and the selected schedules are carried for reference only.

use rust_decimal::Decimal;

use crate::models::{AuditStep, AuditWarning, InvoiceSchedule, Sow, SowBilling};

/// The billing of one fixed-price or maintenance SOW.
#[derive(Debug, Clone)]
pub struct FixedPriceResult {
    /// The SOW breakdown.
    pub billing: SowBilling,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Raised when no amount was entered.
    pub warning: Option<AuditWarning>,
}

/// Bills the manual amount of a non-T&M SOW.
///
/// A missing amount bills zero and raises a `MANUAL_AMOUNT_MISSING` warning;
/// invoice submission later refuses such a calculation.
pub fn calculate_fixed_price(
    sow: &Sow,
    schedules: &[&InvoiceSchedule],
    manual_amount: Option<Decimal>,
    step_number: u32,
) -> FixedPriceResult {
    let subtotal = manual_amount.unwrap_or(Decimal::ZERO);
    let billing_type = sow.billing_type();

    let warning = match manual_amount {
        Some(_) => None,
        None => Some(AuditWarning {
            code: "MANUAL_AMOUNT_MISSING".to_string(),
            message: format!(
                "SOW '{}' is {} and no manual amount was entered",
                sow.id,
                billing_type.as_str()
            ),
            severity: "high".to_string(),
        }),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "manual_amount".to_string(),
        rule_name: "Manual Amount".to_string(),
        input: serde_json::json!({
            "sow_id": sow.id,
            "billing_type": billing_type.as_str(),
            "schedule_ids": schedules.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            "manual_amount": manual_amount.map(|a| a.normalize().to_string())
        }),
        output: serde_json::json!({
            "subtotal": subtotal.normalize().to_string()
        }),
        reasoning: format!(
            "{} SOW billed at the entered amount {}; timesheets not used",
            billing_type.as_str(),
            subtotal.normalize()
        ),
    };

    FixedPriceResult {
        billing: SowBilling {
            sow_id: sow.id.clone(),
            sow_name: sow.name.clone(),
            billing_type,
            schedule_ids: schedules.iter().map(|s| s.id.clone()).collect(),
            lines: Vec::new(),
            employee_totals: Vec::new(),
            manual_amount,
            subtotal,
        },
        audit_step,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingType;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sow(billing_type: BillingType) -> Sow {
        Sow::new(
            "sow_fp",
            "Website redesign",
            billing_type,
            "prj_001",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            "VND",
        )
        .with_schedule(
            "sch_m1",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            false,
        )
    }

    #[test]
    fn test_fixed_price_uses_manual_amount() {
        let sow = sow(BillingType::FixedPrice);
        let schedules = vec![&sow.schedules[0]];

        let result = calculate_fixed_price(&sow, &schedules, Some(dec("50000000")), 1);

        assert_eq!(result.billing.subtotal, dec("50000000"));
        assert_eq!(result.billing.manual_amount, Some(dec("50000000")));
        assert!(result.billing.lines.is_empty());
        assert!(result.warning.is_none());
        assert_eq!(result.audit_step.rule_id, "manual_amount");
    }

    #[test]
    fn test_maintenance_billed_like_fixed_price() {
        let sow = sow(BillingType::Maintenance);

        let result = calculate_fixed_price(&sow, &[], Some(dec("3000000")), 2);

        assert_eq!(result.billing.billing_type, BillingType::Maintenance);
        assert_eq!(result.billing.subtotal, dec("3000000"));
        assert!(result.billing.schedule_ids.is_empty());
    }

    #[test]
    fn test_missing_amount_warns_and_bills_zero() {
        let sow = sow(BillingType::FixedPrice);

        let result = calculate_fixed_price(&sow, &[], None, 1);

        assert_eq!(result.billing.subtotal, Decimal::ZERO);
        let warning = result.warning.unwrap();
        assert_eq!(warning.code, "MANUAL_AMOUNT_MISSING");
        assert_eq!(warning.severity, "high");
    }
}
