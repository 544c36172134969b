//! SOW merging.
//!
//! Two or more T&M SOWs of the same project can be combined into a
//! [`MergedSow`] and invoiced together. The [`BillingWorkspace`] owns the SOW
//! list and the merged groups for the lifetime of a billing session.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{MergedSow, ResourcePosition, Sow, merged_position_id};

/// Combines `sows` into one merged group.
///
/// # Errors
///
/// Returns `MergeRejected` with a user-facing reason when fewer than two SOWs
/// are given, a SOW appears twice, any SOW is not T&M, the SOWs span more than
/// one project, or their currencies differ.
///
/// # Example
///
/// ```
/// use invoice_engine::calculation::merge_sows;
/// use invoice_engine::models::{BillingType, Sow};
/// use chrono::NaiveDate;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
/// let a = Sow::new("sow_a", "Backend", BillingType::TimeAndMaterials, "prj_1", d(1, 1), d(6, 30), "VND");
/// let b = Sow::new("sow_b", "Mobile", BillingType::TimeAndMaterials, "prj_1", d(3, 1), d(12, 31), "VND");
///
/// let merged = merge_sows(&[&a, &b]).unwrap();
/// assert_eq!(merged.start_date, d(1, 1));
/// assert_eq!(merged.end_date, d(12, 31));
/// ```
pub fn merge_sows(sows: &[&Sow]) -> EngineResult<MergedSow> {
    let reject = |reason: String| EngineError::MergeRejected { reason };

    if sows.len() < 2 {
        return Err(reject(
            "Select at least two SOWs to merge".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = sows.iter().find(|s| !seen.insert(s.id.as_str())) {
        return Err(reject(format!("SOW '{}' was selected twice", duplicate.id)));
    }

    if let Some(sow) = sows.iter().find(|s| !s.billing_type().is_time_and_materials()) {
        return Err(reject(format!(
            "Only Time & Materials SOWs can be merged; '{}' is {}",
            sow.name,
            sow.billing_type().as_str()
        )));
    }

    let first = sows[0];
    if sows.iter().any(|s| s.project_id != first.project_id) {
        return Err(reject(
            "All merged SOWs must belong to the same project".to_string(),
        ));
    }
    if let Some(sow) = sows.iter().find(|s| s.currency != first.currency) {
        return Err(reject(format!(
            "All merged SOWs must share one currency; '{}' is in {} and '{}' in {}",
            first.name, first.currency, sow.name, sow.currency
        )));
    }

    let mut schedules: Vec<_> = sows.iter().flat_map(|s| s.schedules.iter().cloned()).collect();
    schedules.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.sow_id.cmp(&b.sow_id))
    });

    let positions = sows
        .iter()
        .flat_map(|sow| {
            sow.positions.iter().map(move |p| ResourcePosition {
                id: merged_position_id(&sow.id, &p.id),
                project_id: p.project_id.clone().or_else(|| Some(sow.project_id.clone())),
                ..p.clone()
            })
        })
        .collect();

    let constituent_ids: Vec<String> = sows.iter().map(|s| s.id.clone()).collect();

    Ok(MergedSow {
        id: format!("merged:{}", constituent_ids.join("+")),
        name: sows
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(" + "),
        project_id: first.project_id.clone(),
        currency: first.currency.clone(),
        start_date: sows.iter().map(|s| s.start_date).min().unwrap_or(first.start_date),
        end_date: sows.iter().map(|s| s.end_date).max().unwrap_or(first.end_date),
        constituent_ids,
        schedules,
        positions,
    })
}

/// A row of the billing workspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkspaceEntry<'a> {
    /// A SOW that is not part of any merged group.
    Standalone(&'a Sow),
    /// An active merged group.
    Merged(&'a MergedSow),
}

/// The SOWs of a billing session and the groups merged from them.
#[derive(Debug, Clone, Default)]
pub struct BillingWorkspace {
    sows: Vec<Sow>,
    merged: Vec<MergedSow>,
}

impl BillingWorkspace {
    /// Creates a workspace over `sows` with no merged groups.
    pub fn new(sows: Vec<Sow>) -> Self {
        Self {
            sows,
            merged: Vec::new(),
        }
    }

    /// All SOWs, merged or not.
    pub fn sows(&self) -> &[Sow] {
        &self.sows
    }

    /// Active merged groups.
    pub fn merged_groups(&self) -> &[MergedSow] {
        &self.merged
    }

    /// Finds a SOW by id.
    pub fn sow(&self, sow_id: &str) -> Option<&Sow> {
        self.sows.iter().find(|s| s.id == sow_id)
    }

    /// Standalone SOWs in their original order, followed by merged groups.
    pub fn entries(&self) -> Vec<WorkspaceEntry<'_>> {
        self.sows
            .iter()
            .filter(|s| !self.merged.iter().any(|m| m.contains(&s.id)))
            .map(WorkspaceEntry::Standalone)
            .chain(self.merged.iter().map(WorkspaceEntry::Merged))
            .collect()
    }

    /// Merges the given SOWs into a new group.
    ///
    /// The workspace is left untouched when the merge is refused.
    ///
    /// # Errors
    ///
    /// `SowNotFound` for unknown ids; `MergeRejected` when a SOW already
    /// belongs to a group or [`merge_sows`] refuses the selection.
    pub fn merge(&mut self, sow_ids: &[&str]) -> EngineResult<&MergedSow> {
        let mut selected = Vec::with_capacity(sow_ids.len());
        for id in sow_ids {
            let sow = self.sow(id).ok_or_else(|| EngineError::SowNotFound {
                sow_id: id.to_string(),
            })?;
            if let Some(group) = self.merged.iter().find(|m| m.contains(id)) {
                return Err(EngineError::MergeRejected {
                    reason: format!("SOW '{}' is already merged into '{}'", sow.name, group.name),
                });
            }
            selected.push(sow);
        }

        let merged = merge_sows(&selected)?;
        info!(
            merged_id = %merged.id,
            constituents = merged.constituent_ids.len(),
            "Merged SOWs"
        );
        self.merged.push(merged);

        let index = self.merged.len() - 1;
        Ok(&self.merged[index])
    }

    /// Dissolves a merged group, restoring its constituents as standalone SOWs.
    ///
    /// # Errors
    ///
    /// `SowNotFound` if no group has this id.
    pub fn unmerge(&mut self, merged_id: &str) -> EngineResult<MergedSow> {
        let index = self
            .merged
            .iter()
            .position(|m| m.id == merged_id)
            .ok_or_else(|| EngineError::SowNotFound {
                sow_id: merged_id.to_string(),
            })?;
        let group = self.merged.remove(index);
        debug!(merged_id = %group.id, "Unmerged SOWs");
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn tm(id: &str, project: &str) -> Sow {
        Sow::new(
            id,
            format!("SOW {}", id),
            BillingType::TimeAndMaterials,
            project,
            d(1, 1),
            d(12, 31),
            "VND",
        )
    }

    fn workspace() -> BillingWorkspace {
        BillingWorkspace::new(vec![
            tm("sow_a", "prj_1")
                .with_schedule("a_jan", d(1, 1), d(1, 31), false)
                .with_position("dev", "Developer", Some(Decimal::new(100, 0)), None),
            tm("sow_b", "prj_1")
                .with_schedule("b_jan", d(1, 1), d(1, 31), false)
                .with_schedule("b_feb", d(2, 1), d(2, 28), false)
                .with_position("dev", "Developer", Some(Decimal::new(120, 0)), None),
            tm("sow_c", "prj_2"),
            Sow::new(
                "sow_fp",
                "Fixed",
                BillingType::FixedPrice,
                "prj_1",
                d(1, 1),
                d(12, 31),
                "VND",
            ),
        ])
    }

    #[test]
    fn test_merge_unions_schedules_and_prefixes_positions() {
        let mut ws = workspace();
        let merged = ws.merge(&["sow_a", "sow_b"]).unwrap().clone();

        assert_eq!(merged.constituent_ids, vec!["sow_a", "sow_b"]);
        let schedule_ids: Vec<&str> = merged.schedules.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(schedule_ids, vec!["a_jan", "b_jan", "b_feb"]);
        let position_ids: Vec<&str> = merged.positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(position_ids, vec!["sow_a-dev", "sow_b-dev"]);
        assert_eq!(merged.positions[1].sow_id, "sow_b");
        assert_eq!(merged.name, "SOW sow_a + SOW sow_b");
    }

    #[test]
    fn test_entries_list_standalone_then_merged() {
        let mut ws = workspace();
        ws.merge(&["sow_a", "sow_b"]).unwrap();

        let entries = ws.entries();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], WorkspaceEntry::Standalone(s) if s.id == "sow_c"));
        assert!(matches!(entries[1], WorkspaceEntry::Standalone(s) if s.id == "sow_fp"));
        assert!(matches!(entries[2], WorkspaceEntry::Merged(_)));
    }

    #[test]
    fn test_single_sow_rejected_workspace_unchanged() {
        let mut ws = workspace();
        let result = ws.merge(&["sow_a"]);

        assert!(matches!(result, Err(EngineError::MergeRejected { .. })));
        assert!(ws.merged_groups().is_empty());
        assert_eq!(ws.entries().len(), 4);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut ws = workspace();
        assert!(matches!(ws.merge(&[]), Err(EngineError::MergeRejected { .. })));
        assert!(ws.merged_groups().is_empty());
    }

    #[test]
    fn test_different_projects_rejected() {
        let mut ws = workspace();
        match ws.merge(&["sow_a", "sow_c"]) {
            Err(EngineError::MergeRejected { reason }) => {
                assert!(reason.contains("same project"))
            }
            other => panic!("Expected MergeRejected, got {:?}", other),
        }
        assert!(ws.merged_groups().is_empty());
    }

    #[test]
    fn test_fixed_price_rejected() {
        let mut ws = workspace();
        match ws.merge(&["sow_a", "sow_fp"]) {
            Err(EngineError::MergeRejected { reason }) => {
                assert!(reason.contains("fixed_price"))
            }
            other => panic!("Expected MergeRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut usd = tm("sow_usd", "prj_1");
        usd.currency = "USD".to_string();
        let a = tm("sow_a", "prj_1");

        assert!(matches!(
            merge_sows(&[&a, &usd]),
            Err(EngineError::MergeRejected { .. })
        ));
    }

    #[test]
    fn test_duplicate_selection_rejected() {
        let a = tm("sow_a", "prj_1");
        assert!(matches!(
            merge_sows(&[&a, &a]),
            Err(EngineError::MergeRejected { .. })
        ));
    }

    #[test]
    fn test_already_merged_sow_rejected() {
        let mut ws = BillingWorkspace::new(vec![
            tm("sow_a", "prj_1"),
            tm("sow_b", "prj_1"),
            tm("sow_d", "prj_1"),
        ]);
        ws.merge(&["sow_a", "sow_b"]).unwrap();

        assert!(matches!(
            ws.merge(&["sow_b", "sow_d"]),
            Err(EngineError::MergeRejected { .. })
        ));
        assert_eq!(ws.merged_groups().len(), 1);
    }

    #[test]
    fn test_unknown_sow_is_not_found() {
        let mut ws = workspace();
        assert!(matches!(
            ws.merge(&["sow_a", "sow_zzz"]),
            Err(EngineError::SowNotFound { .. })
        ));
    }

    #[test]
    fn test_unmerge_restores_constituents() {
        let mut ws = workspace();
        let id = ws.merge(&["sow_a", "sow_b"]).unwrap().id.clone();

        let group = ws.unmerge(&id).unwrap();

        assert_eq!(group.constituent_ids.len(), 2);
        assert!(ws.merged_groups().is_empty());
        assert_eq!(ws.entries().len(), 4);
        assert!(matches!(ws.unmerge(&id), Err(EngineError::SowNotFound { .. })));
    }
}
