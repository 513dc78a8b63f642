//! Split payouts
//!
//! A split payout pays several beneficiaries out of one payout, each taking a
//! share (`percentage_of_payout`) of it. Shares must add up to exactly 100%.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocation::{AllocationCalculator, AllocationResult, MarketData};
use crate::amount::Percentage;
use crate::error::{AllocationError, Result};
use crate::payout::{OnChainPayoutRecord, PayoutRecord};
use crate::vault::VaultState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitBeneficiary {
    /// Beneficiary wallet address
    pub beneficiary: String,
    #[serde(default)]
    pub severity: String,
    pub percentage_of_payout: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSummary {
    pub sum_of_shares: String,
    pub beneficiary_count: usize,
    /// Beneficiaries per (lower-cased) severity
    pub severities: BTreeMap<String, usize>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryAllocation {
    pub beneficiary: String,
    pub severity: String,
    pub percentage_of_payout: String,
    pub allocation: AllocationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAllocation {
    pub summary: SplitSummary,
    pub allocations: Vec<BeneficiaryAllocation>,
}

/// Collapse repeated beneficiaries into one entry, summing their shares.
///
/// Addresses compare case-insensitively. The first entry of an address keeps
/// its position and severity.
pub fn merge_beneficiaries(entries: &[SplitBeneficiary]) -> Result<Vec<SplitBeneficiary>> {
    let mut merged: Vec<(SplitBeneficiary, Percentage)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let share = Percentage::parse(&entry.percentage_of_payout)?;
        match merged
            .iter_mut()
            .find(|(existing, _)| existing.beneficiary.eq_ignore_ascii_case(&entry.beneficiary))
        {
            Some((_, total)) => *total = &*total + &share,
            None => merged.push((entry.clone(), share)),
        }
    }

    Ok(merged
        .into_iter()
        .map(|(mut entry, share)| {
            entry.percentage_of_payout = share.to_string();
            entry
        })
        .collect())
}

pub fn summarize_split(entries: &[SplitBeneficiary]) -> Result<SplitSummary> {
    let mut sum = Percentage::zero();
    let mut severities = BTreeMap::new();

    for entry in entries {
        sum = &sum + &Percentage::parse(&entry.percentage_of_payout)?;
        let severity = entry.severity.trim().to_lowercase();
        if !severity.is_empty() {
            *severities.entry(severity).or_insert(0) += 1;
        }
    }

    Ok(SplitSummary {
        is_complete: sum == Percentage::hundred(),
        sum_of_shares: sum.to_string(),
        beneficiary_count: entries.len(),
        severities,
    })
}

/// Reject a payout taking more of the vault than its max bounty allows.
pub fn check_max_bounty(vault: &VaultState, percentage_to_pay: &str) -> Result<()> {
    let Some(max_bounty) = vault.max_bounty else {
        return Ok(());
    };

    let requested = Percentage::parse_bounded(percentage_to_pay)?;
    let max = Percentage::from_split(max_bounty);
    if requested > max {
        return Err(AllocationError::ExceedsMaxBounty {
            percentage: requested.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Allocation of a split payout, one result per (merged) beneficiary.
pub fn allocate_split(
    calculator: &AllocationCalculator,
    vault: &VaultState,
    payout: &PayoutRecord,
    on_chain_payouts: &[OnChainPayoutRecord],
    percentage_to_pay_of_vault: &str,
    beneficiaries: &[SplitBeneficiary],
    market: MarketData,
) -> Result<SplitAllocation> {
    check_max_bounty(vault, percentage_to_pay_of_vault)?;

    let merged = merge_beneficiaries(beneficiaries)?;
    let summary = summarize_split(&merged)?;
    if !summary.is_complete {
        return Err(AllocationError::IncompleteSplit {
            sum: summary.sum_of_shares,
        });
    }

    let allocations = merged
        .into_iter()
        .map(|entry| {
            let allocation = calculator.compute(
                Some(vault),
                Some(payout),
                on_chain_payouts,
                Some(percentage_to_pay_of_vault),
                Some(entry.percentage_of_payout.as_str()),
                market,
            )?;
            Ok(BeneficiaryAllocation {
                beneficiary: entry.beneficiary,
                severity: entry.severity,
                percentage_of_payout: entry.percentage_of_payout,
                allocation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Split payout from vault {} across {} beneficiaries",
        vault.id,
        allocations.len()
    );

    Ok(SplitAllocation {
        summary,
        allocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{plain_vault, sample_vault, tokens};

    fn entry(beneficiary: &str, severity: &str, share: &str) -> SplitBeneficiary {
        SplitBeneficiary {
            beneficiary: beneficiary.to_string(),
            severity: severity.to_string(),
            percentage_of_payout: share.to_string(),
        }
    }

    #[test]
    fn test_merge_sums_duplicates() {
        let merged = merge_beneficiaries(&[
            entry("0xAAA", "high", "30"),
            entry("0xBBB", "low", "20"),
            entry("0xaaa", "medium", "12.5"),
        ])
        .unwrap();

        assert_eq!(
            merged,
            vec![entry("0xAAA", "high", "42.5"), entry("0xBBB", "low", "20")]
        );
    }

    #[test]
    fn test_merge_rejects_bad_share() {
        assert!(merge_beneficiaries(&[entry("0xAAA", "high", "thirty")]).is_err());
    }

    #[test]
    fn test_summary() {
        let summary = summarize_split(&[
            entry("0x1", "High", "50"),
            entry("0x2", "high", "25.5"),
            entry("0x3", "", "24.5"),
        ])
        .unwrap();

        assert!(summary.is_complete);
        assert_eq!(summary.sum_of_shares, "100");
        assert_eq!(summary.beneficiary_count, 3);
        assert_eq!(summary.severities.get("high"), Some(&2));
        assert_eq!(summary.severities.len(), 1);

        let partial = summarize_split(&[entry("0x1", "low", "99.99")]).unwrap();
        assert!(!partial.is_complete);
    }

    #[test]
    fn test_max_bounty() {
        let vault = sample_vault();
        assert!(check_max_bounty(&vault, "90").is_ok());
        assert!(matches!(
            check_max_bounty(&vault, "90.5"),
            Err(AllocationError::ExceedsMaxBounty { .. })
        ));

        let mut uncapped = sample_vault();
        uncapped.max_bounty = None;
        assert!(check_max_bounty(&uncapped, "100").is_ok());
    }

    #[test]
    fn test_allocate_split() {
        let vault = plain_vault();
        let split = allocate_split(
            &AllocationCalculator::default(),
            &vault,
            &PayoutRecord::default(),
            &[],
            "10",
            &[
                entry("0xAAA", "high", "60"),
                entry("0xBBB", "low", "25"),
                entry("0xaaa", "high", "15"),
            ],
            MarketData::default(),
        )
        .unwrap();

        assert_eq!(split.allocations.len(), 2);
        let first = &split.allocations[0];
        assert_eq!(first.percentage_of_payout, "75");
        // 1000 paid, 75% of it, 50% immediate
        assert_eq!(
            first.allocation.immediate.as_ref().unwrap().token_raw,
            tokens(375).raw().to_string()
        );
        let second = &split.allocations[1];
        assert_eq!(
            second.allocation.total.as_ref().unwrap().token_raw,
            tokens(250).raw().to_string()
        );
    }

    #[test]
    fn test_allocate_incomplete_split() {
        let err = allocate_split(
            &AllocationCalculator::default(),
            &plain_vault(),
            &PayoutRecord::default(),
            &[],
            "10",
            &[entry("0xAAA", "high", "60")],
            MarketData::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AllocationError::IncompleteSplit {
                sum: "60".to_string()
            }
        );
    }
}
