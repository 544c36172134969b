//! Configuration loading and management for the Invoice Engine.
//!
//! This module provides functionality to load engine configurations from YAML files,
//! including engine metadata, drive link templates, and the billing policy.
//!
//! # Example
//!
//! ```no_run
//! use invoice_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded engine: {}", config.config().metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BillingPolicy, DriveLinkTemplates, EngineConfig, EngineFile, EngineMetadata, PinningPolicy,
    PolicyFile,
};
