//! Configuration types for invoice calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Metadata about the engine deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// The deployment name shown in logs.
    pub name: String,
    /// The policy version the deployment was configured for.
    pub version: String,
}

/// URL templates used to derive drive links from a file id.
///
/// Each template must contain the `{id}` placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveLinkTemplates {
    /// Template for the in-browser viewer.
    pub view: String,
    /// Template for a direct download.
    pub direct: String,
    /// Template for an embeddable preview.
    pub web_preview: String,
}

impl Default for DriveLinkTemplates {
    fn default() -> Self {
        Self {
            view: "https://drive.google.com/file/d/{id}/view".to_string(),
            direct: "https://drive.google.com/uc?export=download&id={id}".to_string(),
            web_preview: "https://drive.google.com/file/d/{id}/preview".to_string(),
        }
    }
}

/// engine.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineFile {
    /// Engine metadata.
    pub engine: EngineMetadata,
    /// Drive link templates.
    #[serde(default)]
    pub drive: DriveLinkTemplates,
}

/// Constants of the billing policy.
///
/// The defaults encode the fixed 20-workday month, 8-hour workday and one
/// allowed leave day per month.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillingPolicy {
    /// Working days in a standard month.
    pub workdays_per_month: u32,
    /// Hours in a standard workday.
    pub hours_per_workday: Decimal,
    /// Leave days per billed month that are not deducted (monthly positions).
    pub allowed_leave_days_per_month: u32,
    /// Leave days allowed in every prior period before holidays are added.
    pub base_leave_allowance_days: u32,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            workdays_per_month: 20,
            hours_per_workday: Decimal::new(8, 0),
            allowed_leave_days_per_month: 1,
            base_leave_allowance_days: 1,
        }
    }
}

impl BillingPolicy {
    /// Hours in a standard month (160 with the default policy).
    pub fn standard_monthly_hours(&self) -> Decimal {
        Decimal::from(self.workdays_per_month) * self.hours_per_workday
    }

    /// The cost of one workday for a monthly rate.
    pub fn daily_rate(&self, monthly_rate: Decimal) -> Decimal {
        monthly_rate / Decimal::from(self.workdays_per_month)
    }
}

/// Limits on the pin board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinningPolicy {
    /// Maximum number of simultaneously pinned items.
    pub max_pinned_items: usize,
}

impl Default for PinningPolicy {
    fn default() -> Self {
        Self {
            max_pinned_items: 5,
        }
    }
}

/// policy.yaml file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyFile {
    /// Billing constants.
    pub billing: BillingPolicy,
    /// Pin board limits.
    #[serde(default)]
    pub pinning: PinningPolicy,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    drive: DriveLinkTemplates,
    policy: PolicyFile,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(metadata: EngineMetadata, drive: DriveLinkTemplates, policy: PolicyFile) -> Self {
        Self {
            metadata,
            drive,
            policy,
        }
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the drive link templates.
    pub fn drive(&self) -> &DriveLinkTemplates {
        &self.drive
    }

    /// Returns the billing policy.
    pub fn billing(&self) -> &BillingPolicy {
        &self.policy.billing
    }

    /// Returns the pin board limits.
    pub fn pinning(&self) -> &PinningPolicy {
        &self.policy.pinning
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(
            EngineMetadata {
                name: "invoice-engine".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            DriveLinkTemplates::default(),
            PolicyFile::default(),
        )
    }
}
