//! CLI commands

pub mod allocate;
pub mod server;
pub mod split;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;

use payout_allocation::{
    AllocationResult, Config, MonetaryAmount, OnChainPayoutRecord, PayoutRecord, PriceBook,
    VaultRecord, VaultState,
};

use crate::style::*;

/// Payout inputs shared by the allocation commands
#[derive(Args, Debug)]
pub struct PayoutInput {
    /// Vault JSON file (subgraph shape)
    #[arg(long)]
    pub vault: PathBuf,

    /// Payout JSON file (treated as not yet created when omitted)
    #[arg(long)]
    pub payout: Option<PathBuf>,

    /// JSON array of on-chain payouts of the vault
    #[arg(long)]
    pub on_chain: Option<PathBuf>,

    /// Percentage of the vault paid out
    #[arg(short, long)]
    pub percentage: String,

    /// Token price in USD (defaults to the configured price book)
    #[arg(long)]
    pub price: Option<f64>,
}

pub struct LoadedInput {
    pub vault: VaultRecord,
    pub payout: PayoutRecord,
    pub on_chain: Vec<OnChainPayoutRecord>,
}

impl PayoutInput {
    pub fn load(&self) -> Result<LoadedInput> {
        Ok(LoadedInput {
            vault: read_json(&self.vault)?,
            payout: match &self.payout {
                Some(path) => read_json(path)?,
                None => PayoutRecord::default(),
            },
            on_chain: match &self.on_chain {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            },
        })
    }

    /// Explicit price, or the configured price of the vault token
    pub fn price_for(&self, config: &Config, vault: &VaultState) -> f64 {
        self.price.unwrap_or_else(|| {
            PriceBook::from_prices(config.prices.clone()).price_of(&vault.token.address)
        })
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn print_allocation(result: &AllocationResult) {
    if result.is_empty() {
        print_warning("Nothing to allocate for this payout.");
        return;
    }

    println!();
    println!(
        "{:<14}  {:>20}  {:>12}  {:>10}",
        "Bucket", "Tokens", "USD", "Share"
    );
    println!("{}", "─".repeat(62));

    let rows: [(&str, &Option<MonetaryAmount>); 7] = [
        ("Immediate", &result.immediate),
        ("Vested", &result.vested),
        ("Hats reward", &result.hats_reward),
        ("Committee", &result.committee),
        ("Governance", &result.governance),
        ("Total hacker", &result.total_hacker),
        ("Total", &result.total),
    ];

    for (label, amount) in rows {
        match amount {
            Some(amount) => println!(
                "{:<14}  {:>20}  {:>12}  {:>10}",
                label,
                amount.token_formatted,
                amount.usd_formatted,
                amount.percentage_of_total.as_deref().unwrap_or("")
            ),
            None => println!("{:<14}  {:>20}", label, "--"),
        }
    }
}
