//! Allocate command - allocation of a single payout

use anyhow::Result;

use payout_allocation::server::AllocationRequest;
use payout_allocation::{
    resolve_payout_state, AllocationCalculator, Config, MarketData, PayoutState, VaultState,
};

use super::{print_allocation, PayoutInput};
use crate::client::AllocationClient;
use crate::style::*;

pub async fn run(
    server: Option<&str>,
    config: &Config,
    input: &PayoutInput,
    share: Option<&str>,
) -> Result<()> {
    print_header("Payout Allocation");

    let loaded = input.load()?;

    let result = match server {
        Some(url) => {
            print_info(&format!("Computing on {}", url));
            let request = AllocationRequest {
                vault: Some(loaded.vault),
                payout: Some(loaded.payout),
                on_chain_payouts: loaded.on_chain,
                percentage_to_pay_of_vault: Some(input.percentage.clone()),
                percentage_of_payout: share.map(str::to_string),
                token_price_usd: input.price,
            };
            AllocationClient::new(url).allocate(&request).await?
        }
        None => {
            let vault = VaultState::try_from(&loaded.vault)?;
            println!(
                "Vault:     {} ({}, {})",
                vault.id, vault.version, vault.token.symbol
            );

            match resolve_payout_state(&vault, &loaded.payout, &loaded.on_chain)? {
                PayoutState::Confirmed(rewards) => {
                    let approved = rewards
                        .approved_at
                        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!("Payout:    {} (approved {})", style_green("executed"), approved);
                }
                PayoutState::Projected(_) => {
                    println!("Payout:    {}", style_yellow("projected from vault balance"));
                }
            }

            let market = MarketData {
                token_price_usd: input.price_for(config, &vault),
            };
            AllocationCalculator::new(config.formatting).compute(
                Some(&vault),
                Some(&loaded.payout),
                &loaded.on_chain,
                Some(input.percentage.as_str()),
                share,
                market,
            )?
        }
    };

    print_allocation(&result);
    Ok(())
}
