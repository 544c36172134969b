//! Merged SOW model.
//!
//! A [`MergedSow`] is a calculation-only composite of several T&M SOWs on the
//! same project. It is never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{InvoiceSchedule, ResourcePosition};

/// A virtual composite of two or more T&M SOWs sharing one project.
///
/// Schedules keep their original ids and owning SOW. Position ids are
/// prefixed with the owning SOW id so positions from different constituents
/// never collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSow {
    /// Identifier derived from the constituent ids.
    pub id: String,
    /// Display name joining the constituent names.
    pub name: String,
    /// The single project every constituent belongs to.
    pub project_id: String,
    /// Currency shared by the constituents.
    pub currency: String,
    /// Earliest constituent start date.
    pub start_date: NaiveDate,
    /// Latest constituent end date.
    pub end_date: NaiveDate,
    /// Ids of the merged SOWs, in selection order.
    pub constituent_ids: Vec<String>,
    /// Union of the constituents' schedules ordered by start date.
    pub schedules: Vec<InvoiceSchedule>,
    /// Union of the constituents' positions with prefixed ids.
    pub positions: Vec<ResourcePosition>,
}

impl MergedSow {
    /// Returns true if `sow_id` is one of the merged SOWs.
    pub fn contains(&self, sow_id: &str) -> bool {
        self.constituent_ids.iter().any(|id| id == sow_id)
    }

    /// Returns the schedules contributed by one constituent.
    pub fn schedules_of<'a>(
        &'a self,
        sow_id: &'a str,
    ) -> impl Iterator<Item = &'a InvoiceSchedule> + 'a {
        self.schedules.iter().filter(move |s| s.sow_id == sow_id)
    }
}

/// Builds the collision-free id of a position inside a merged SOW.
pub fn merged_position_id(sow_id: &str, position_id: &str) -> String {
    format!("{}-{}", sow_id, position_id)
}
