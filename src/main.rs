use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use invoice_engine::api::{AppState, create_router};
use invoice_engine::config::ConfigLoader;
use invoice_engine::logging::{LogFormat, init_logging};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// HTTP service for SOW invoice calculation.
#[derive(Debug, Parser)]
#[command(name = "invoice-engine", version, about)]
struct Cli {
    /// Directory holding engine.yaml and policy.yaml.
    #[arg(long, env = "INVOICE_ENGINE_CONFIG", default_value = "./config/default")]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "INVOICE_ENGINE_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Log output format.
    #[arg(long, env = "INVOICE_ENGINE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, env = "INVOICE_ENGINE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level).context("failed to initialize logging")?;

    let loader = ConfigLoader::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    info!(
        name = %loader.config().metadata().name,
        version = %loader.config().metadata().version,
        "Configuration loaded"
    );

    let router = create_router(AppState::new(loader));
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!(address = %cli.bind, "Invoice engine listening");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received SIGINT, shutting down");
        }
        signal_token.cancel();
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("server error")?;

    info!("Invoice engine stopped");
    Ok(())
}
