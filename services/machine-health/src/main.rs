//! Machine Health CLI
//!
//! Command-line interface for the predictive maintenance dashboard.

use std::path::PathBuf;

use clap::Parser;
use machine_health::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "machine-health")]
#[command(about = "Predictive maintenance dashboard backed by a remote prediction service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Prediction endpoint URL (overrides config file)
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, dashboard_port={:?}, endpoint_url={:?}, log_level={:?}",
        args.config,
        args.dashboard_port,
        args.endpoint_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }
    if let Some(endpoint_url) = args.endpoint_url {
        config.predictor.endpoint_url = endpoint_url;
    }

    tracing::info!("Starting machine health dashboard");
    machine_health::run(config).await?;

    Ok(())
}
