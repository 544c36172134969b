//! Invoice calculation entry point.
//!
//! [`calculate_invoice`] validates a billing request, prices every selected
//! SOW (constituents of a merged group are priced separately) and, in FUTURE
//! mode, settles the prior period of every T&M SOW.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::BillingPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, CalculationMode, CalculationResult, InvoiceSchedule, InvoiceTotals,
    MergedSow, ResourceAllocation, Sow, TimesheetEntry,
};

use super::{
    calculate_adjustment, calculate_fixed_price, calculate_time_and_materials, checked,
    find_previous_schedule,
};

/// The records a calculation reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingData {
    /// Known SOWs.
    #[serde(default)]
    pub sows: Vec<Sow>,
    /// Allocations of the SOWs' positions.
    #[serde(default)]
    pub allocations: Vec<ResourceAllocation>,
    /// Hours logged against the allocations.
    #[serde(default)]
    pub timesheets: Vec<TimesheetEntry>,
}

impl BillingData {
    fn sow(&self, sow_id: &str) -> EngineResult<&Sow> {
        self.sows
            .iter()
            .find(|s| s.id == sow_id)
            .ok_or_else(|| EngineError::SowNotFound {
                sow_id: sow_id.to_string(),
            })
    }
}

/// What to invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRequest {
    /// NORMAL or FUTURE.
    #[serde(default)]
    pub mode: CalculationMode,
    /// SOWs invoiced together. One id for a single SOW, the constituents for
    /// a merged group.
    pub sow_ids: Vec<String>,
    /// Selected, not yet billed schedules.
    #[serde(default)]
    pub schedule_ids: Vec<String>,
    /// Entered amounts of FixedPrice/Maintenance SOWs, by SOW id.
    #[serde(default)]
    pub manual_amounts: HashMap<String, Decimal>,
}

impl BillingRequest {
    /// A request invoicing the constituents of a merged group.
    pub fn for_merged(merged: &MergedSow, schedule_ids: Vec<String>, mode: CalculationMode) -> Self {
        Self {
            mode,
            sow_ids: merged.constituent_ids.clone(),
            schedule_ids,
            manual_amounts: HashMap::new(),
        }
    }
}

/// Calculates the invoice for `request`.
///
/// In FUTURE mode only T&M SOWs with at least one selected schedule of their
/// own are settled; the previous period of each is the schedule ending last
/// before the earliest selected start across the whole request.
///
/// # Errors
///
/// - `CalculationError` when no SOW is selected or a SOW is selected twice
/// - `SowNotFound` for an unknown SOW
/// - `InvalidSow`, `InvalidAllocation`, `InvalidTimesheet` for malformed records
/// - `CurrencyMismatch` when the SOWs do not share one currency
/// - `ScheduleNotFound` when a schedule is not part of a selected SOW
/// - `ScheduleAlreadyBilled` when a billed schedule is selected
/// - `CalculationError` when an amount overflows
///
/// # Example
///
/// ```
/// use invoice_engine::calculation::{BillingData, BillingRequest, calculate_invoice};
/// use invoice_engine::config::BillingPolicy;
/// use invoice_engine::models::{BillingType, CalculationMode, ResourceAllocation, Sow, TimesheetEntry};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
/// let sow = Sow::new("sow_001", "Platform", BillingType::TimeAndMaterials, "prj_001", d(1), d(31), "VND")
///     .with_schedule("sch_jan", d(1), d(31), false)
///     .with_position("pos_dev", "Developer", Some(Decimal::new(120_000, 0)), None);
/// let allocation = ResourceAllocation {
///     id: "alloc_001".into(),
///     employee_id: "emp_001".into(),
///     employee_name: "Linh Tran".into(),
///     position_id: "pos_dev".into(),
///     sow_id: "sow_001".into(),
///     start_date: d(1),
///     end_date: d(31),
/// };
/// let timesheets = (1..=20)
///     .map(|day| TimesheetEntry {
///         id: format!("ts_{}", day),
///         allocation_id: "alloc_001".into(),
///         date: d(day),
///         hours: Decimal::new(8, 0),
///         is_holiday: false,
///     })
///     .collect();
///
/// let data = BillingData { sows: vec![sow], allocations: vec![allocation], timesheets };
/// let request = BillingRequest {
///     mode: CalculationMode::Normal,
///     sow_ids: vec!["sow_001".into()],
///     schedule_ids: vec!["sch_jan".into()],
///     ..Default::default()
/// };
///
/// let result = calculate_invoice(&data, &request, &BillingPolicy::default()).unwrap();
/// assert_eq!(result.totals.payable, Decimal::new(19_200_000, 0));
/// ```
pub fn calculate_invoice(
    data: &BillingData,
    request: &BillingRequest,
    policy: &BillingPolicy,
) -> EngineResult<CalculationResult> {
    let start_time = Instant::now();

    let sows = resolve_sows(data, request)?;
    let currency = check_currency(&sows)?;
    let selected = resolve_schedules(&sows, &request.schedule_ids)?;
    validate_records(data, &sows)?;

    let mut sow_billings = Vec::with_capacity(sows.len());
    let mut adjustments = Vec::new();
    let mut audit_steps: Vec<AuditStep> = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number: u32 = 1;

    for sow in &sows {
        let mut schedules: Vec<&InvoiceSchedule> = selected
            .iter()
            .copied()
            .filter(|s| s.sow_id == sow.id)
            .collect();
        schedules.sort_by_key(|s| s.start_date);

        if sow.billing_type().is_time_and_materials() {
            let result = calculate_time_and_materials(
                sow,
                &schedules,
                &data.allocations,
                &data.timesheets,
                policy,
                step_number,
            )?;
            step_number += result.audit_steps.len() as u32;
            audit_steps.extend(result.audit_steps);
            warnings.extend(result.warnings);
            sow_billings.push(result.billing);
        } else {
            let result = calculate_fixed_price(
                sow,
                &schedules,
                request.manual_amounts.get(&sow.id).copied(),
                step_number,
            );
            step_number += 1;
            audit_steps.push(result.audit_step);
            warnings.extend(result.warning);
            sow_billings.push(result.billing);
        }
    }

    if request.mode == CalculationMode::Future {
        let earliest_start = selected.iter().map(|s| s.start_date).min();

        for sow in sows.iter().filter(|s| s.billing_type().is_time_and_materials()) {
            if !selected.iter().any(|s| s.sow_id == sow.id) {
                debug!(sow_id = %sow.id, "No schedule selected; adjustment skipped");
                continue;
            }

            let previous = earliest_start.and_then(|start| find_previous_schedule(sow, start));
            match previous {
                Some(previous) => {
                    let result = calculate_adjustment(
                        sow,
                        previous,
                        &data.allocations,
                        &data.timesheets,
                        policy,
                        step_number,
                    )?;
                    step_number += result.audit_steps.len() as u32;
                    audit_steps.extend(result.audit_steps);
                    warnings.extend(result.warnings);
                    adjustments.push(result.summary);
                }
                None => {
                    debug!(sow_id = %sow.id, "No previous period; adjustment skipped");
                    audit_steps.push(AuditStep {
                        step_number,
                        rule_id: "prior_period_adjustment".to_string(),
                        rule_name: "Prior Period Adjustment".to_string(),
                        input: serde_json::json!({
                            "sow_id": sow.id,
                            "earliest_selected_start": earliest_start.map(|d| d.to_string())
                        }),
                        output: serde_json::json!({
                            "adjustment": "0"
                        }),
                        reasoning: "No schedule ends before the selected periods; nothing to settle"
                            .to_string(),
                    });
                    step_number += 1;
                }
            }
        }
    }

    let base_total = checked::total(sow_billings.iter().map(|b| b.subtotal), "base total")?;
    let total_adjustment = checked::total(
        adjustments.iter().map(|a| a.total_adjustment),
        "total adjustment",
    )?;
    let total_hours = checked::total(
        sow_billings
            .iter()
            .flat_map(|b| b.lines.iter())
            .map(|l| l.hours),
        "total hours",
    )?;
    let totals = InvoiceTotals {
        base_total,
        total_adjustment,
        payable: checked::difference(base_total, total_adjustment, "payable")?,
        total_hours,
    };

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        sow_count = sow_billings.len(),
        mode = ?request.mode,
        base_total = %totals.base_total,
        total_adjustment = %totals.total_adjustment,
        payable = %totals.payable,
        duration_us,
        "Invoice calculated"
    );

    Ok(CalculationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        mode: request.mode,
        currency,
        sows: sow_billings,
        adjustments,
        totals,
        audit_trace: AuditTrace {
            steps: audit_steps,
            warnings,
            duration_us,
        },
    })
}

fn resolve_sows<'a>(data: &'a BillingData, request: &BillingRequest) -> EngineResult<Vec<&'a Sow>> {
    if request.sow_ids.is_empty() {
        return Err(EngineError::CalculationError {
            message: "no SOW selected".to_string(),
        });
    }

    let mut sows: Vec<&Sow> = Vec::with_capacity(request.sow_ids.len());
    for sow_id in &request.sow_ids {
        if sows.iter().any(|s| &s.id == sow_id) {
            return Err(EngineError::CalculationError {
                message: format!("SOW '{}' selected more than once", sow_id),
            });
        }
        let sow = data.sow(sow_id)?;
        sow.validate()?;
        sows.push(sow);
    }
    Ok(sows)
}

fn check_currency(sows: &[&Sow]) -> EngineResult<String> {
    let expected = &sows[0].currency;
    match sows.iter().find(|s| &s.currency != expected) {
        Some(other) => Err(EngineError::CurrencyMismatch {
            sow_id: other.id.clone(),
            expected: expected.clone(),
            found: other.currency.clone(),
        }),
        None => Ok(expected.clone()),
    }
}

fn resolve_schedules<'a>(
    sows: &[&'a Sow],
    schedule_ids: &[String],
) -> EngineResult<Vec<&'a InvoiceSchedule>> {
    let mut selected: Vec<&InvoiceSchedule> = Vec::with_capacity(schedule_ids.len());

    for schedule_id in schedule_ids {
        if selected.iter().any(|s| &s.id == schedule_id) {
            continue;
        }
        let schedule = sows
            .iter()
            .find_map(|sow| sow.schedule(schedule_id))
            .ok_or_else(|| EngineError::ScheduleNotFound {
                schedule_id: schedule_id.clone(),
            })?;
        if schedule.billed {
            return Err(EngineError::ScheduleAlreadyBilled {
                schedule_id: schedule.id.clone(),
                start_date: schedule.start_date,
                end_date: schedule.end_date,
            });
        }
        selected.push(schedule);
    }

    Ok(selected)
}

fn validate_records(data: &BillingData, sows: &[&Sow]) -> EngineResult<()> {
    let allocations: Vec<&ResourceAllocation> = data
        .allocations
        .iter()
        .filter(|a| sows.iter().any(|s| s.id == a.sow_id))
        .collect();

    for allocation in &allocations {
        allocation.validate()?;
    }
    for entry in data
        .timesheets
        .iter()
        .filter(|e| allocations.iter().any(|a| a.id == e.allocation_id))
    {
        entry.validate()?;
    }
    Ok(())
}
