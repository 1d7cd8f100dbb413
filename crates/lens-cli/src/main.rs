//! Lending-market lens - Entry Point

use anyhow::Result;
use clap::Parser;
use lens_cli::{Application, Args, LensConfig};
use lens_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the JSON records.
    lens_telemetry::init_logging()?;

    info!("Starting lens v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config_path();
    info!(config_path = %config_path, "Loading configuration");
    let config = LensConfig::from_file(&config_path)?;
    info!(rpc_url = %config.rpc_url, "Configuration loaded");

    let app = Application::connect(config).await?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            trigger.cancel();
        }
    });

    let outcome = app.run(&args.command, &cancel).await;

    if args.metrics {
        match Metrics::render() {
            Ok(text) => eprintln!("{text}"),
            Err(e) => error!(error = %e, "Failed to render metrics"),
        }
    }

    println!("{}", outcome?);
    Ok(())
}
