//! Error types for payout allocation
//!
//! Missing inputs are never errors: the calculator answers them with an
//! empty allocation. Only structurally invalid data ends up here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("invalid percentage '{value}': {reason}")]
    InvalidPercentage { value: String, reason: String },

    #[error("invalid amount in field '{field}': '{value}'")]
    InvalidAmount { field: &'static str, value: String },

    #[error("split '{field}' is out of range: {value} (max 10000)")]
    InvalidSplit { field: &'static str, value: String },

    #[error("unknown vault version: {0}")]
    UnknownVaultVersion(String),

    #[error("percentage to pay {percentage}% exceeds the vault max bounty of {max}%")]
    ExceedsMaxBounty { percentage: String, max: String },

    #[error("beneficiary shares sum to {sum}%, expected 100%")]
    IncompleteSplit { sum: String },
}

impl AllocationError {
    pub(crate) fn invalid_percentage(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPercentage {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AllocationError> = std::result::Result<T, E>;
