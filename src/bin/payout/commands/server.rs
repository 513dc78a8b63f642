//! Server command - run the allocation server

use anyhow::Result;

use payout_allocation::Config;

use crate::style::*;

pub async fn run(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    print_info(&format!(
        "Listening on {}:{}",
        config.server.host, config.server.port
    ));
    print_success(&format!("{} seed token prices loaded", config.prices.len()));

    payout_allocation::server::run_server(&config).await
}
