//! Shared test data

use num_bigint::BigUint;

use crate::amount::TokenAmount;
use crate::payout::OnChainPayoutRecord;
use crate::vault::{max_uint256, MasterRecord, VaultRecord, VaultState};

const ONE_TOKEN: &str = "000000000000000000";

/// Whole tokens of an 18-decimals token.
pub fn tokens(whole: u64) -> TokenAmount {
    TokenAmount::new(BigUint::from(whole) * BigUint::from(10u32).pow(18), 18)
}

/// Raw string of `whole` 18-decimals tokens.
pub fn raw(whole: u64) -> String {
    if whole == 0 {
        "0".to_string()
    } else {
        format!("{}{}", whole, ONE_TOKEN)
    }
}

/// v2 vault holding 10000 MTR, governance split inherited from master.
pub fn sample_record() -> VaultRecord {
    VaultRecord {
        id: "0xvault".to_string(),
        version: "v2".to_string(),
        staking_token: "0xToken".to_string(),
        staking_token_symbol: "MTR".to_string(),
        staking_token_decimals: "18".to_string(),
        honey_pot_balance: raw(10_000),
        hacker_reward_split: "5000".to_string(),
        hacker_vested_reward_split: "3000".to_string(),
        committee_reward_split: "2000".to_string(),
        governance_hat_reward_split: max_uint256().to_string(),
        hacker_hat_reward_split: "500".to_string(),
        max_bounty: Some("9000".to_string()),
        master: MasterRecord {
            default_governance_hat_reward_split: "1000".to_string(),
            default_hacker_hat_reward_split: "700".to_string(),
        },
    }
}

pub fn sample_vault() -> VaultState {
    VaultState::try_from(sample_record()).unwrap()
}

/// v2 vault with no governance or hats reward carve-out.
pub fn plain_record() -> VaultRecord {
    VaultRecord {
        governance_hat_reward_split: "0".to_string(),
        hacker_hat_reward_split: "0".to_string(),
        ..sample_record()
    }
}

pub fn plain_vault() -> VaultState {
    VaultState::try_from(plain_record()).unwrap()
}

/// Executed payout: 1000 / 500 / 100 / 50 / 50 tokens.
pub fn approved_payout(id: &str) -> OnChainPayoutRecord {
    OnChainPayoutRecord {
        id: id.to_string(),
        approved_at: Some("1700000000".to_string()),
        hacker_reward: raw(1000),
        hacker_vested_reward: raw(500),
        hacker_hat_reward: raw(100),
        committee_reward: raw(50),
        governance_hat_reward: raw(50),
    }
}
