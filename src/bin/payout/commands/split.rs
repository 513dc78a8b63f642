//! Split command - allocation of a payout shared by several beneficiaries

use std::path::Path;

use anyhow::Result;

use payout_allocation::server::SplitAllocationRequest;
use payout_allocation::{
    allocate_split, AllocationCalculator, Config, MarketData, SplitAllocation, SplitBeneficiary,
    VaultState,
};

use super::{print_allocation, read_json, PayoutInput};
use crate::client::AllocationClient;
use crate::style::*;

pub async fn run(
    server: Option<&str>,
    config: &Config,
    input: &PayoutInput,
    beneficiaries: &Path,
) -> Result<()> {
    print_header("Split Payout Allocation");

    let loaded = input.load()?;
    let beneficiaries: Vec<SplitBeneficiary> = read_json(beneficiaries)?;

    let split = match server {
        Some(url) => {
            print_info(&format!("Computing on {}", url));
            let request = SplitAllocationRequest {
                vault: loaded.vault,
                payout: loaded.payout,
                on_chain_payouts: loaded.on_chain,
                percentage_to_pay_of_vault: input.percentage.clone(),
                beneficiaries,
                token_price_usd: input.price,
            };
            AllocationClient::new(url).split_allocate(&request).await?
        }
        None => {
            let vault = VaultState::try_from(&loaded.vault)?;
            let market = MarketData {
                token_price_usd: input.price_for(config, &vault),
            };
            allocate_split(
                &AllocationCalculator::new(config.formatting),
                &vault,
                &loaded.payout,
                &loaded.on_chain,
                &input.percentage,
                &beneficiaries,
                market,
            )?
        }
    };

    print_split(&split);
    Ok(())
}

fn print_split(split: &SplitAllocation) {
    let summary = &split.summary;
    println!();
    println!("Beneficiaries:    {}", summary.beneficiary_count);
    println!("Sum of shares:    {}%", style_green(&summary.sum_of_shares));
    if !summary.severities.is_empty() {
        let severities: Vec<String> = summary
            .severities
            .iter()
            .map(|(severity, count)| format!("{}: {}", severity, count))
            .collect();
        println!("Severities:       {}", severities.join(", "));
    }

    for (i, entry) in split.allocations.iter().enumerate() {
        println!();
        println!(
            "{} {}  {}  {}%",
            style_cyan(&format!("#{}", i + 1)),
            style_bold(&truncate_address(&entry.beneficiary)),
            style_dim(&entry.severity),
            entry.percentage_of_payout
        );
        print_allocation(&entry.allocation);
    }
}
