//! Payout Allocation - Split bounty vault payouts across reward buckets
//!
//! A bounty vault pays hackers out of its honeypot. Every payout is divided
//! between the hacker (immediate and vested rewards), the hats reward pool,
//! the committee and governance. This crate computes that division.
//!
//! # How it works
//!
//! 1. Vault and payout records are read from the subgraph shape
//!    ([`VaultRecord`], [`PayoutRecord`], [`OnChainPayoutRecord`])
//! 2. The payout is resolved once into a [`PayoutState`]: confirmed on chain
//!    with fixed amounts, or projected from the vault balance
//! 3. Bucket amounts are computed exactly in the token's smallest unit
//! 4. Amounts are rendered as compact token / USD / percentage strings
//!
//! # Vault versions
//!
//! - v1: every split applies to the full payout
//! - v2: immediate, vested and committee share what is left after the
//!   governance and hats reward splits

pub mod allocation;
pub mod amount;
pub mod config;
pub mod error;
pub mod format;
pub mod payout;
pub mod prices;
pub mod server;
pub mod split;
pub mod vault;

#[cfg(test)]
mod fixtures;

pub use allocation::{compute, AllocationCalculator, AllocationResult, MarketData};
pub use amount::{Fraction, Percentage, TokenAmount};
pub use config::Config;
pub use error::AllocationError;
pub use format::{millify, FormatOptions, MonetaryAmount};
pub use payout::{resolve_payout_state, OnChainPayoutRecord, PayoutRecord, PayoutState};
pub use prices::PriceBook;
pub use split::{allocate_split, SplitAllocation, SplitBeneficiary};
pub use vault::{VaultRecord, VaultState, VaultVersion};
