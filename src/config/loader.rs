//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{BillingPolicy, DriveLinkTemplates, EngineConfig, EngineFile, PolicyFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml   # Engine metadata and drive link templates
/// └── policy.yaml   # Billing and pinning policy
/// ```
///
/// # Example
///
/// ```no_run
/// use invoice_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Standard month: {} hours", loader.policy().standard_monthly_hours());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The billing policy is unusable (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let engine = Self::load_yaml::<EngineFile>(&engine_path)?;
        Self::check_templates(&engine_path, &engine.drive)?;

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<PolicyFile>(&policy_path)?;
        Self::check_policy(&policy_path, &policy.billing)?;

        debug!(
            name = %engine.engine.name,
            version = %engine.engine.version,
            workdays_per_month = policy.billing.workdays_per_month,
            "Loaded engine configuration"
        );

        Ok(Self {
            config: EngineConfig::new(engine.engine, engine.drive, policy),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn check_policy(path: &Path, policy: &BillingPolicy) -> EngineResult<()> {
        if policy.workdays_per_month == 0 || policy.hours_per_workday <= Decimal::ZERO {
            return Err(EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: "workdays_per_month and hours_per_workday must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn check_templates(path: &Path, templates: &DriveLinkTemplates) -> EngineResult<()> {
        let missing = [
            ("view", &templates.view),
            ("direct", &templates.direct),
            ("web_preview", &templates.web_preview),
        ]
        .into_iter()
        .find(|(_, template)| !template.contains("{id}"));

        match missing {
            Some((name, _)) => Err(EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: format!("drive template '{}' has no {{id}} placeholder", name),
            }),
            None => Ok(()),
        }
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the billing policy.
    pub fn policy(&self) -> &BillingPolicy {
        self.config.billing()
    }
}
