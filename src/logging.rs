//! Structured logging setup for the server binary.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` read from
//! `RUST_LOG` and either human-readable or JSON output.

use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Builds the filter: `RUST_LOG` when set, otherwise `default_level` for this
/// crate and `info` for the HTTP stack.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "invoice_engine={},tower=info,hyper=info",
            default_level
        ))
    })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, default_level: &str) -> Result<(), TryInitError> {
    let filter = env_filter(default_level);
    let registry = tracing_subscriber::registry();

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_filter(filter),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_filter(filter))
            .try_init()?,
    }

    tracing::info!(format = ?format, "logging initialized");
    Ok(())
}
