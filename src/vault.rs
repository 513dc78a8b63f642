//! Vault state as seen by the allocation calculator
//!
//! Vault data arrives from the subgraph with every number encoded as a
//! decimal string and with max-uint256 standing in for "use the master
//! default split". `VaultRecord` is that wire shape; `VaultState` is the
//! validated form, where the sentinel has become `None`.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::amount::{parse_uint, TokenAmount, SPLIT_SCALE};
use crate::error::{AllocationError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultVersion {
    V1,
    V2,
}

impl FromStr for VaultVersion {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            other => Err(AllocationError::UnknownVaultVersion(other.to_string())),
        }
    }
}

impl fmt::Display for VaultVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Vault split values, each in `[0, 10000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultSplits {
    pub hacker_reward: u32,
    pub hacker_vested_reward: u32,
    pub committee_reward: u32,
    /// `None` inherits the master default
    pub governance_hat_reward: Option<u32>,
    /// `None` inherits the master default
    pub hacker_hat_reward: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterDefaults {
    pub governance_hat_reward_split: u32,
    pub hacker_hat_reward_split: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultState {
    pub id: String,
    pub version: VaultVersion,
    pub token: TokenInfo,
    pub honey_pot_balance: TokenAmount,
    pub splits: VaultSplits,
    pub master: MasterDefaults,
    /// Cap on the share of the vault one payout may take (scale 10000)
    pub max_bounty: Option<u32>,
}

impl VaultState {
    /// Governance split with the master default applied.
    pub fn governance_split(&self) -> u32 {
        self.splits
            .governance_hat_reward
            .unwrap_or(self.master.governance_hat_reward_split)
    }

    /// Hats reward split with the master default applied.
    pub fn hats_reward_split(&self) -> u32 {
        self.splits
            .hacker_hat_reward
            .unwrap_or(self.master.hacker_hat_reward_split)
    }
}

/// Vault as served by the subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub id: String,
    pub version: String,
    pub staking_token: String,
    pub staking_token_symbol: String,
    pub staking_token_decimals: String,
    pub honey_pot_balance: String,
    pub hacker_reward_split: String,
    pub hacker_vested_reward_split: String,
    pub committee_reward_split: String,
    pub governance_hat_reward_split: String,
    pub hacker_hat_reward_split: String,
    #[serde(default)]
    pub max_bounty: Option<String>,
    pub master: MasterRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterRecord {
    pub default_governance_hat_reward_split: String,
    pub default_hacker_hat_reward_split: String,
}

impl TryFrom<&VaultRecord> for VaultState {
    type Error = AllocationError;

    fn try_from(record: &VaultRecord) -> Result<Self> {
        let decimals: u8 = record.staking_token_decimals.trim().parse().map_err(|_| {
            AllocationError::InvalidAmount {
                field: "stakingTokenDecimals",
                value: record.staking_token_decimals.clone(),
            }
        })?;

        Ok(Self {
            id: record.id.clone(),
            version: record.version.parse()?,
            token: TokenInfo {
                address: record.staking_token.clone(),
                symbol: record.staking_token_symbol.clone(),
                decimals,
            },
            honey_pot_balance: TokenAmount::parse_raw(
                "honeyPotBalance",
                &record.honey_pot_balance,
                decimals,
            )?,
            splits: VaultSplits {
                hacker_reward: parse_split("hackerRewardSplit", &record.hacker_reward_split)?,
                hacker_vested_reward: parse_split(
                    "hackerVestedRewardSplit",
                    &record.hacker_vested_reward_split,
                )?,
                committee_reward: parse_split(
                    "committeeRewardSplit",
                    &record.committee_reward_split,
                )?,
                governance_hat_reward: parse_inheritable_split(
                    "governanceHatRewardSplit",
                    &record.governance_hat_reward_split,
                )?,
                hacker_hat_reward: parse_inheritable_split(
                    "hackerHatRewardSplit",
                    &record.hacker_hat_reward_split,
                )?,
            },
            master: MasterDefaults {
                governance_hat_reward_split: parse_split(
                    "defaultGovernanceHatRewardSplit",
                    &record.master.default_governance_hat_reward_split,
                )?,
                hacker_hat_reward_split: parse_split(
                    "defaultHackerHatRewardSplit",
                    &record.master.default_hacker_hat_reward_split,
                )?,
            },
            max_bounty: record
                .max_bounty
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_split("maxBounty", v))
                .transpose()?,
        })
    }
}

impl TryFrom<VaultRecord> for VaultState {
    type Error = AllocationError;

    fn try_from(record: VaultRecord) -> Result<Self> {
        Self::try_from(&record)
    }
}

/// Largest uint256, used on chain to mean "not set".
pub fn max_uint256() -> BigUint {
    (BigUint::one() << 256u32) - BigUint::one()
}

fn parse_split(field: &'static str, value: &str) -> Result<u32> {
    let parsed = parse_uint(field, value)?;
    u32::try_from(&parsed)
        .ok()
        .filter(|split| *split <= SPLIT_SCALE)
        .ok_or_else(|| AllocationError::InvalidSplit {
            field,
            value: value.to_string(),
        })
}

fn parse_inheritable_split(field: &'static str, value: &str) -> Result<Option<u32>> {
    if parse_uint(field, value)? == max_uint256() {
        return Ok(None);
    }
    parse_split(field, value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_record;

    #[test]
    fn test_vault_from_record() {
        let vault = VaultState::try_from(sample_record()).unwrap();
        assert_eq!(vault.version, VaultVersion::V2);
        assert_eq!(vault.token.decimals, 18);
        assert_eq!(vault.honey_pot_balance.to_decimal_string(), "10000");
        assert_eq!(vault.splits.hacker_reward, 5000);
        assert_eq!(vault.max_bounty, Some(9000));
    }

    #[test]
    fn test_sentinel_inherits_master_default() {
        let vault = VaultState::try_from(sample_record()).unwrap();
        assert_eq!(vault.splits.governance_hat_reward, None);
        assert_eq!(vault.governance_split(), 1000);
        assert_eq!(vault.splits.hacker_hat_reward, Some(500));
        assert_eq!(vault.hats_reward_split(), 500);

        let record = VaultRecord {
            hacker_hat_reward_split: max_uint256().to_string(),
            ..sample_record()
        };
        let vault = VaultState::try_from(record).unwrap();
        assert_eq!(vault.splits.hacker_hat_reward, None);
        assert_eq!(vault.hats_reward_split(), 700);
    }

    #[test]
    fn test_record_parses_subgraph_json() -> Result<(), serde_json::Error> {
        let json = r#"{
            "id": "0xabc",
            "version": "v1",
            "stakingToken": "0xdef",
            "stakingTokenSymbol": "USDC",
            "stakingTokenDecimals": "6",
            "honeyPotBalance": "2500000000",
            "hackerRewardSplit": "6000",
            "hackerVestedRewardSplit": "2000",
            "committeeRewardSplit": "500",
            "governanceHatRewardSplit": "1000",
            "hackerHatRewardSplit": "500",
            "master": {
                "defaultGovernanceHatRewardSplit": "1000",
                "defaultHackerHatRewardSplit": "500"
            }
        }"#;

        let record: VaultRecord = serde_json::from_str(json)?;
        let vault = VaultState::try_from(&record).unwrap();
        assert_eq!(vault.version, VaultVersion::V1);
        assert_eq!(vault.honey_pot_balance.to_decimal_string(), "2500");
        assert_eq!(vault.max_bounty, None);
        Ok(())
    }

    #[test]
    fn test_rejects_malformed_records() {
        let mut record = sample_record();
        record.version = "v3".to_string();
        assert!(matches!(
            VaultState::try_from(&record),
            Err(AllocationError::UnknownVaultVersion(_))
        ));

        let mut record = sample_record();
        record.hacker_reward_split = "10001".to_string();
        assert!(matches!(
            VaultState::try_from(&record),
            Err(AllocationError::InvalidSplit {
                field: "hackerRewardSplit",
                ..
            })
        ));

        let mut record = sample_record();
        record.honey_pot_balance = "12.5".to_string();
        assert!(matches!(
            VaultState::try_from(&record),
            Err(AllocationError::InvalidAmount {
                field: "honeyPotBalance",
                ..
            })
        ));

        let mut record = sample_record();
        record.staking_token_decimals = "eighteen".to_string();
        assert!(VaultState::try_from(&record).is_err());
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("V2".parse::<VaultVersion>().unwrap(), VaultVersion::V2);
        assert_eq!(VaultVersion::V1.to_string(), "v1");
    }
}
