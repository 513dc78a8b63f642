//! Payout allocation calculator
//!
//! Splits one payout across the reward buckets of a vault:
//!
//! - **immediate**: hacker reward paid right away
//! - **vested**: hacker reward released over time
//! - **hats reward**: protocol reward pool
//! - **committee**: committee fee
//! - **governance**: governance fee
//!
//! Executed payouts are sliced from the amounts fixed on chain. Proposed
//! payouts are projected from the current vault balance. Both paths produce
//! exact smallest-unit amounts; floats only appear when rendering.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amount::{Fraction, Percentage, TokenAmount};
use crate::error::Result;
use crate::format::{FormatOptions, MonetaryAmount};
use crate::payout::{
    resolve_payout_state, OnChainPayoutRecord, PayoutRecord, PayoutRewards, PayoutState,
    ProjectedSplits,
};
use crate::vault::VaultState;

/// Market data needed to price a payout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub token_price_usd: f64,
}

/// Rendered allocation. `None` marks a bucket that does not apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub immediate: Option<MonetaryAmount>,
    pub vested: Option<MonetaryAmount>,
    pub hats_reward: Option<MonetaryAmount>,
    pub committee: Option<MonetaryAmount>,
    pub governance: Option<MonetaryAmount>,
    pub total_hacker: Option<MonetaryAmount>,
    pub total: Option<MonetaryAmount>,
}

impl AllocationResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Exact bucket amounts, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketAmounts {
    pub immediate: TokenAmount,
    pub vested: TokenAmount,
    pub hats_reward: TokenAmount,
    pub committee: TokenAmount,
    pub governance: TokenAmount,
}

impl BucketAmounts {
    pub fn total_hacker(&self) -> TokenAmount {
        &self.immediate + &self.vested
    }

    pub fn total(&self) -> TokenAmount {
        let mut total = self.total_hacker();
        for amount in [&self.hats_reward, &self.committee, &self.governance] {
            total = &total + amount;
        }
        total
    }
}

/// Slice of an executed payout attributed to one beneficiary.
pub fn confirmed_buckets(rewards: &PayoutRewards, beneficiary_factor: &Fraction) -> BucketAmounts {
    BucketAmounts {
        immediate: rewards.immediate.scale(beneficiary_factor),
        vested: rewards.vested.scale(beneficiary_factor),
        hats_reward: rewards.hats_reward.scale(beneficiary_factor),
        committee: rewards.committee.scale(beneficiary_factor),
        governance: rewards.governance.scale(beneficiary_factor),
    }
}

/// Projection of a payout taking `payout_factor` of `balance`.
///
/// Governance and hats reward apply to the full amount; the other three
/// buckets share what remains (see [`ProjectedSplits::split_factor`]).
pub fn projected_buckets(
    balance: &TokenAmount,
    splits: &ProjectedSplits,
    payout_factor: &Fraction,
) -> BucketAmounts {
    let remainder = &splits.split_factor() * payout_factor;
    let share_of_remainder = |split: u32| balance.scale(&(&Fraction::from_split(split) * &remainder));
    let share_of_full = |split: u32| balance.scale(&(&Fraction::from_split(split) * payout_factor));

    BucketAmounts {
        immediate: share_of_remainder(splits.immediate),
        vested: share_of_remainder(splits.vested),
        committee: share_of_remainder(splits.committee),
        governance: share_of_full(splits.governance),
        hats_reward: share_of_full(splits.hats_reward),
    }
}

/// Turns vault and payout data into rendered allocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationCalculator {
    format: FormatOptions,
}

impl AllocationCalculator {
    pub fn new(format: FormatOptions) -> Self {
        Self { format }
    }

    pub fn format_options(&self) -> FormatOptions {
        self.format
    }

    /// Compute the allocation of `payout`.
    ///
    /// Returns an empty result while `vault`, `payout` or
    /// `percentage_to_pay_of_vault` is not available yet. Fails only on
    /// malformed input: bad percentages or unreadable on-chain amounts.
    pub fn compute(
        &self,
        vault: Option<&VaultState>,
        payout: Option<&PayoutRecord>,
        on_chain_payouts: &[OnChainPayoutRecord],
        percentage_to_pay_of_vault: Option<&str>,
        percentage_of_payout: Option<&str>,
        market: MarketData,
    ) -> Result<AllocationResult> {
        let (Some(vault), Some(payout), Some(percentage_to_pay)) =
            (vault, payout, non_blank(percentage_to_pay_of_vault))
        else {
            return Ok(AllocationResult::default());
        };

        let percentage_to_pay = Percentage::parse_bounded(percentage_to_pay)?;
        let beneficiary_factor = beneficiary_factor(percentage_of_payout)?;
        let state = resolve_payout_state(vault, payout, on_chain_payouts)?;

        Ok(self.allocate(
            vault,
            &state,
            &percentage_to_pay,
            &beneficiary_factor,
            market,
        ))
    }

    /// Allocation for an already resolved payout state.
    pub fn allocate(
        &self,
        vault: &VaultState,
        state: &PayoutState,
        percentage_to_pay: &Percentage,
        beneficiary_factor: &Fraction,
        market: MarketData,
    ) -> AllocationResult {
        let buckets = match state {
            PayoutState::Confirmed(rewards) => confirmed_buckets(rewards, beneficiary_factor),
            PayoutState::Projected(splits) => {
                let payout_factor = &percentage_to_pay.to_fraction() * beneficiary_factor;
                projected_buckets(&vault.honey_pot_balance, splits, &payout_factor)
            }
        };

        debug!(
            "Allocated payout from vault {} ({}): total {} {}",
            vault.id,
            if state.is_confirmed() { "confirmed" } else { "projected" },
            buckets.total(),
            vault.token.symbol
        );

        self.render(&buckets, &vault.token.symbol, sanitize_price(market.token_price_usd))
    }

    fn render(&self, buckets: &BucketAmounts, symbol: &str, price: f64) -> AllocationResult {
        let total = buckets.total();
        let bucket = |amount: &TokenAmount| {
            self.format
                .monetary_amount(amount, Some(&total), symbol, price)
        };

        AllocationResult {
            immediate: bucket(&buckets.immediate),
            vested: bucket(&buckets.vested),
            hats_reward: bucket(&buckets.hats_reward),
            committee: bucket(&buckets.committee),
            governance: bucket(&buckets.governance),
            total_hacker: bucket(&buckets.total_hacker()),
            total: self.format.monetary_amount(&total, None, symbol, price),
        }
    }
}

/// Compute an allocation with the default formatting.
pub fn compute(
    vault: Option<&VaultState>,
    payout: Option<&PayoutRecord>,
    on_chain_payouts: &[OnChainPayoutRecord],
    percentage_to_pay_of_vault: Option<&str>,
    percentage_of_payout: Option<&str>,
    market: MarketData,
) -> Result<AllocationResult> {
    AllocationCalculator::default().compute(
        vault,
        payout,
        on_chain_payouts,
        percentage_to_pay_of_vault,
        percentage_of_payout,
        market,
    )
}

/// Share of the payout going to one beneficiary; the whole payout when the
/// share is not given.
pub fn beneficiary_factor(percentage_of_payout: Option<&str>) -> Result<Fraction> {
    match non_blank(percentage_of_payout) {
        Some(share) => Ok(Percentage::parse_bounded(share)?.to_fraction()),
        None => Ok(Fraction::one()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price >= 0.0 {
        price
    } else {
        warn!("Ignoring invalid token price {}", price);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocationError;
    use crate::fixtures::{approved_payout, plain_vault, sample_record, sample_vault, tokens};
    use crate::vault::{max_uint256, VaultVersion};

    const CLAIM_ID: &str = "0xclaim";

    fn claimed_payout() -> PayoutRecord {
        PayoutRecord {
            payout_claim_id: Some(CLAIM_ID.to_string()),
            ..Default::default()
        }
    }

    fn token_raw(amount: &Option<MonetaryAmount>) -> Option<&str> {
        amount.as_ref().map(|a| a.token_raw.as_str())
    }

    fn raw_of(whole: u64) -> String {
        tokens(whole).raw().to_string()
    }

    fn confirmed(share: Option<&str>) -> AllocationResult {
        compute(
            Some(&sample_vault()),
            Some(&claimed_payout()),
            &[approved_payout(CLAIM_ID)],
            Some("10"),
            share,
            MarketData {
                token_price_usd: 2.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_confirmed_single_beneficiary() {
        let result = confirmed(None);

        assert_eq!(token_raw(&result.total), Some(raw_of(1700).as_str()));
        assert_eq!(token_raw(&result.total_hacker), Some(raw_of(1500).as_str()));
        assert_eq!(token_raw(&result.immediate), Some(raw_of(1000).as_str()));
        assert_eq!(token_raw(&result.governance), Some(raw_of(50).as_str()));

        let immediate = result.immediate.as_ref().unwrap();
        assert_eq!(immediate.percentage_of_total.as_deref(), Some("58.82%"));
        assert_eq!(immediate.token_formatted, "1K MTR");
        assert_eq!(immediate.usd_formatted, "2K$");

        let total = result.total.as_ref().unwrap();
        assert_eq!(total.token_formatted, "1.7K MTR");
        assert!(total.percentage_of_total.is_none());
    }

    #[test]
    fn test_confirmed_split_beneficiary() {
        let whole = confirmed(None);
        let quarter = confirmed(Some("25"));

        assert_eq!(token_raw(&quarter.total), Some(raw_of(425).as_str()));
        assert_eq!(token_raw(&quarter.immediate), Some(raw_of(250).as_str()));
        assert_eq!(token_raw(&quarter.vested), Some(raw_of(125).as_str()));
        assert_eq!(token_raw(&quarter.hats_reward), Some(raw_of(25).as_str()));
        assert_eq!(
            quarter.committee.as_ref().map(|a| a.token_number.as_str()),
            Some("12.5")
        );

        for (a, b) in [
            (&whole.immediate, &quarter.immediate),
            (&whole.vested, &quarter.vested),
            (&whole.committee, &quarter.committee),
            (&whole.total_hacker, &quarter.total_hacker),
        ] {
            assert_eq!(
                a.as_ref().unwrap().percentage_of_total,
                b.as_ref().unwrap().percentage_of_total
            );
        }
    }

    #[test]
    fn test_projected_v2_vault() {
        let result = compute(
            Some(&plain_vault()),
            Some(&PayoutRecord::default()),
            &[],
            Some("10"),
            None,
            MarketData::default(),
        )
        .unwrap();

        assert_eq!(token_raw(&result.immediate), Some(raw_of(500).as_str()));
        assert_eq!(token_raw(&result.vested), Some(raw_of(300).as_str()));
        assert_eq!(token_raw(&result.committee), Some(raw_of(200).as_str()));
        assert!(result.governance.is_none());
        assert!(result.hats_reward.is_none());
        assert_eq!(token_raw(&result.total), Some(raw_of(1000).as_str()));
        assert_eq!(token_raw(&result.total_hacker), Some(raw_of(800).as_str()));
        assert_eq!(
            result.immediate.as_ref().unwrap().percentage_of_total.as_deref(),
            Some("50%")
        );
    }

    #[test]
    fn test_projected_v2_carves_out_governance_and_hats() {
        // governance inherits 10% from master, hats reward is 5%
        let vault = sample_vault();
        let splits = ProjectedSplits::from_vault(&vault);
        let factor = Percentage::parse("10").unwrap().to_fraction();
        let buckets = projected_buckets(&vault.honey_pot_balance, &splits, &factor);

        // 10000 * 10% = 1000 paid; 85% of it shared 50/30/20
        assert_eq!(buckets.immediate, tokens(425));
        assert_eq!(buckets.vested, tokens(255));
        assert_eq!(buckets.committee, tokens(170));
        assert_eq!(buckets.governance, tokens(100));
        assert_eq!(buckets.hats_reward, tokens(50));
        assert_eq!(buckets.total(), tokens(1000));
    }

    #[test]
    fn test_projected_v1_ignores_carve_out() {
        let mut vault = sample_vault();
        vault.version = VaultVersion::V1;
        let splits = ProjectedSplits::from_vault(&vault);
        assert_eq!(splits.split_factor(), Fraction::one());

        let factor = Percentage::parse("10").unwrap().to_fraction();
        let buckets = projected_buckets(&vault.honey_pot_balance, &splits, &factor);
        assert_eq!(buckets.immediate, tokens(500));
        assert_eq!(buckets.governance, tokens(100));
        assert_eq!(buckets.total(), tokens(1150));
    }

    #[test]
    fn test_sentinel_uses_master_default() {
        let mut vault = sample_vault();
        assert_eq!(ProjectedSplits::from_vault(&vault).governance, 1000);

        vault.master.governance_hat_reward_split = 1500;
        assert_eq!(ProjectedSplits::from_vault(&vault).governance, 1500);

        vault.splits.governance_hat_reward = Some(200);
        assert_eq!(ProjectedSplits::from_vault(&vault).governance, 200);
    }

    #[test]
    fn test_hats_reward_sentinel_uses_master_default() {
        let mut vault = sample_vault();
        vault.splits.hacker_hat_reward = None;
        let splits = ProjectedSplits::from_vault(&vault);
        assert_eq!(splits.hats_reward, 700);
        // 100% - 10% governance - 7% hats reward
        assert_eq!(splits.split_factor(), Fraction::from_split(8300));

        let factor = Percentage::parse("10").unwrap().to_fraction();
        let b = projected_buckets(&vault.honey_pot_balance, &splits, &factor);
        assert_eq!(b.hats_reward, tokens(70));
        assert_eq!(b.governance, tokens(100));
        assert_eq!(b.immediate, tokens(415));
        assert_eq!(b.vested, tokens(249));
        assert_eq!(b.committee, tokens(166));
        assert_eq!(b.total(), tokens(1000));
    }

    #[test]
    fn test_hats_reward_sentinel_from_record() {
        let mut record = sample_record();
        record.hacker_hat_reward_split = max_uint256().to_string();
        let vault = VaultState::try_from(&record).unwrap();
        assert_eq!(vault.splits.hacker_hat_reward, None);
        assert_eq!(ProjectedSplits::from_vault(&vault).hats_reward, 700);
    }

    #[test]
    fn test_oversized_splits_do_not_panic() {
        let mut vault = sample_vault();
        vault.splits.governance_hat_reward = Some(u32::MAX);
        vault.splits.hacker_hat_reward = Some(1);

        let result = compute(
            Some(&vault),
            Some(&PayoutRecord::default()),
            &[],
            Some("10"),
            None,
            MarketData::default(),
        )
        .unwrap();
        assert!(result.immediate.is_none());
        assert!(result.governance.is_some());
    }

    #[test]
    fn test_sum_relations_hold_exactly() {
        let vault = sample_vault();
        let splits = ProjectedSplits::from_vault(&vault);
        for (pay, share) in [("33.333", "17"), ("7.5", "100"), ("100", "0.1"), ("0.0001", "3")] {
            let factor = &Percentage::parse(pay).unwrap().to_fraction()
                * &beneficiary_factor(Some(share)).unwrap();
            let b = projected_buckets(&vault.honey_pot_balance, &splits, &factor);

            assert_eq!(b.total_hacker(), &b.immediate + &b.vested);
            let sum = [&b.vested, &b.hats_reward, &b.committee, &b.governance]
                .into_iter()
                .fold(b.immediate.clone(), |acc, x| &acc + x);
            assert_eq!(b.total(), sum);
        }
    }

    #[test]
    fn test_doubling_share_doubles_buckets() {
        let vault = plain_vault();
        let run = |share: &str| {
            compute(
                Some(&vault),
                Some(&PayoutRecord::default()),
                &[],
                Some("10"),
                Some(share),
                MarketData::default(),
            )
            .unwrap()
        };

        let single = run("20");
        let double = run("40");
        assert_eq!(token_raw(&single.immediate), Some(raw_of(100).as_str()));
        assert_eq!(token_raw(&double.immediate), Some(raw_of(200).as_str()));
        assert_eq!(
            single.immediate.as_ref().unwrap().percentage_of_total,
            double.immediate.as_ref().unwrap().percentage_of_total
        );
    }

    #[test]
    fn test_compute_is_idempotent() {
        assert_eq!(confirmed(Some("33.3")), confirmed(Some("33.3")));
    }

    #[test]
    fn test_missing_inputs_give_empty_result() {
        let vault = sample_vault();
        let payout = claimed_payout();
        let market = MarketData::default();

        assert!(compute(None, Some(&payout), &[], Some("10"), None, market)
            .unwrap()
            .is_empty());
        assert!(compute(Some(&vault), None, &[], Some("10"), None, market)
            .unwrap()
            .is_empty());
        assert!(compute(Some(&vault), Some(&payout), &[], None, None, market)
            .unwrap()
            .is_empty());
        assert!(compute(Some(&vault), Some(&payout), &[], Some(""), None, market)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_percentages_fail() {
        let vault = sample_vault();
        let payout = PayoutRecord::default();
        let market = MarketData::default();

        let err = compute(Some(&vault), Some(&payout), &[], Some("ten"), None, market).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidPercentage { .. }));

        let err =
            compute(Some(&vault), Some(&payout), &[], Some("10"), Some("150"), market).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidPercentage { .. }));
    }

    #[test]
    fn test_zero_payout_is_empty() {
        let result = compute(
            Some(&sample_vault()),
            Some(&PayoutRecord::default()),
            &[],
            Some("0"),
            None,
            MarketData::default(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_invalid_price_is_ignored() {
        let result = compute(
            Some(&plain_vault()),
            Some(&PayoutRecord::default()),
            &[],
            Some("10"),
            None,
            MarketData {
                token_price_usd: f64::NAN,
            },
        )
        .unwrap();
        assert_eq!(result.total.unwrap().usd_formatted, "0$");
    }
}
