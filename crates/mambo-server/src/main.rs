//! Mambo bridge server
//!
//! Runs the Mambo platform inside the in-process accessory host until
//! interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use mambo_bridge::MamboPlatform;
use mambo_cloud::HttpMamboClient;
use mambo_config::PlatformConfig;
use mambo_host::{Host, SharedHost};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "mambo")]
#[command(about = "Expose Cecotec Mambo cookers as smart-home accessories")]
struct Args {
    /// Directory holding mambo.yaml and secrets.yaml
    #[arg(long, default_value = ".")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    info!(config_dir = %args.config.display(), "Starting Mambo bridge");

    let config = PlatformConfig::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let api = HttpMamboClient::new(&config.base_url).context("building HTTP client")?;

    let host: SharedHost = Arc::new(Host::new());
    let platform = MamboPlatform::new(config, Arc::new(api), host.clone());

    let _startup = platform.start();
    host.finish_launching();

    info!("Mambo bridge is running");

    tokio::signal::ctrl_c().await?;
    info!(devices = platform.device_count(), "Shutting down...");

    Ok(())
}
