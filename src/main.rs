//! Payout Allocation Server
//!
//! Serves payout allocations for bounty vaults over HTTP

use payout_allocation::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Payout Allocation Server");

    let config_path =
        std::env::var("PAYOUT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load_from(&config_path)?;
    info!("Configuration loaded from {}", config_path);

    payout_allocation::server::run_server(&config).await?;

    Ok(())
}
