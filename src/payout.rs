//! Payout records and branch resolution
//!
//! A payout is either already executed on chain, with fixed reward amounts,
//! or still a proposal whose amounts are projected from the vault balance.
//! `resolve_payout_state` decides which, once, before any arithmetic runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amount::{Fraction, TokenAmount, SPLIT_SCALE};
use crate::error::Result;
use crate::vault::{VaultState, VaultVersion};

/// Payout as stored by the payouts backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecord {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub vault_address: Option<String>,
    /// On-chain claim id, absent until the payout is created on chain
    #[serde(default)]
    pub payout_claim_id: Option<String>,
}

/// Payout as indexed from the vault contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainPayoutRecord {
    pub id: String,
    /// Unix seconds, as a decimal string
    #[serde(default)]
    pub approved_at: Option<String>,
    pub hacker_reward: String,
    pub hacker_vested_reward: String,
    pub hacker_hat_reward: String,
    pub committee_reward: String,
    pub governance_hat_reward: String,
}

impl OnChainPayoutRecord {
    pub fn is_approved(&self) -> bool {
        self.approved_at
            .as_deref()
            .is_some_and(|approved_at| !approved_at.trim().is_empty())
    }
}

/// Reward amounts fixed by an executed payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutRewards {
    pub immediate: TokenAmount,
    pub vested: TokenAmount,
    pub hats_reward: TokenAmount,
    pub committee: TokenAmount,
    pub governance: TokenAmount,
    pub approved_at: Option<DateTime<Utc>>,
}

impl PayoutRewards {
    pub fn from_record(record: &OnChainPayoutRecord, decimals: u8) -> Result<Self> {
        Ok(Self {
            immediate: TokenAmount::parse_raw("hackerReward", &record.hacker_reward, decimals)?,
            vested: TokenAmount::parse_raw(
                "hackerVestedReward",
                &record.hacker_vested_reward,
                decimals,
            )?,
            hats_reward: TokenAmount::parse_raw(
                "hackerHatReward",
                &record.hacker_hat_reward,
                decimals,
            )?,
            committee: TokenAmount::parse_raw(
                "committeeReward",
                &record.committee_reward,
                decimals,
            )?,
            governance: TokenAmount::parse_raw(
                "governanceHatReward",
                &record.governance_hat_reward,
                decimals,
            )?,
            approved_at: record.approved_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// Split values that drive a projected payout, defaults already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedSplits {
    pub version: VaultVersion,
    pub immediate: u32,
    pub vested: u32,
    pub committee: u32,
    pub governance: u32,
    pub hats_reward: u32,
}

impl ProjectedSplits {
    /// Splits above 100% are clamped to 100%.
    pub fn from_vault(vault: &VaultState) -> Self {
        Self {
            version: vault.version,
            immediate: clamp_split("hackerRewardSplit", vault.splits.hacker_reward),
            vested: clamp_split("hackerVestedRewardSplit", vault.splits.hacker_vested_reward),
            committee: clamp_split("committeeRewardSplit", vault.splits.committee_reward),
            governance: clamp_split("governanceHatRewardSplit", vault.governance_split()),
            hats_reward: clamp_split("hackerHatRewardSplit", vault.hats_reward_split()),
        }
    }

    /// Scale applied to the immediate, vested and committee ratios.
    ///
    /// v2 vaults define those three to sum to 100% of what is left after
    /// governance and hats reward are carved out of the full amount.
    pub fn split_factor(&self) -> Fraction {
        match self.version {
            VaultVersion::V1 => Fraction::one(),
            VaultVersion::V2 => {
                let carve_out = self.governance.saturating_add(self.hats_reward);
                if carve_out > SPLIT_SCALE {
                    warn!(
                        "Governance ({}) and hats reward ({}) splits exceed 100%",
                        self.governance, self.hats_reward
                    );
                }
                Fraction::from_split(SPLIT_SCALE.saturating_sub(carve_out))
            }
        }
    }
}

fn clamp_split(field: &str, split: u32) -> u32 {
    if split > SPLIT_SCALE {
        warn!("{} of {} exceeds 100%, clamping", field, split);
        return SPLIT_SCALE;
    }
    split
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutState {
    Confirmed(PayoutRewards),
    Projected(ProjectedSplits),
}

impl PayoutState {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

/// Match `payout` against the indexed on-chain payouts.
pub fn resolve_payout_state(
    vault: &VaultState,
    payout: &PayoutRecord,
    on_chain_payouts: &[OnChainPayoutRecord],
) -> Result<PayoutState> {
    let claim_id = payout
        .payout_claim_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let on_chain = claim_id.and_then(|claim_id| {
        on_chain_payouts
            .iter()
            .find(|record| record.id.eq_ignore_ascii_case(claim_id))
    });

    match on_chain {
        Some(record) if record.is_approved() => {
            debug!("Payout {} is approved on chain", record.id);
            let rewards = PayoutRewards::from_record(record, vault.token.decimals)?;
            Ok(PayoutState::Confirmed(rewards))
        }
        _ => {
            debug!(
                "Projecting payout {:?} from vault {} balance",
                claim_id, vault.id
            );
            Ok(PayoutState::Projected(ProjectedSplits::from_vault(vault)))
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    if parsed.is_none() {
        warn!("Unreadable approval timestamp: {}", value);
    }
    parsed
}
