//! Display formatting for allocation amounts
//!
//! This is the only place where fixed-point amounts are turned into floats.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;

const UNITS: [&str; 7] = ["", "K", "M", "B", "T", "P", "E"];

/// Compact a number with a magnitude suffix, e.g. `1234567.0` -> `"1.23M"`.
///
/// Rounds to `precision` fraction digits and drops trailing zeros.
pub fn millify(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let negative = value < 0.0;
    let mut magnitude = value.abs();
    let mut unit = 0;
    while magnitude >= 1000.0 && unit < UNITS.len() - 1 {
        magnitude /= 1000.0;
        unit += 1;
    }

    let mut text = format!("{:.*}", precision, magnitude);
    // Rounding can carry into the next unit (999.999 -> 1000)
    if text.parse::<f64>().unwrap_or(0.0) >= 1000.0 && unit < UNITS.len() - 1 {
        unit += 1;
        text = format!("{:.*}", precision, magnitude / 1000.0);
    }

    let text = trim_fraction(&text);
    let sign = if negative && text != "0" { "-" } else { "" };
    format!("{}{}{}", sign, text, UNITS[unit])
}

fn trim_fraction(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Rendered view of one allocation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryAmount {
    /// Exact amount in the token's smallest unit
    pub token_raw: String,
    pub token_formatted: String,
    pub token_number: String,
    pub usd_formatted: String,
    pub usd_number: String,
    /// Share of the payout total; `None` on the total itself
    pub percentage_of_total: Option<String>,
}

/// Fraction digits used when rendering each kind of value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub token_precision: usize,
    pub usd_precision: usize,
    pub percentage_precision: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            token_precision: 5,
            usd_precision: 2,
            percentage_precision: 2,
        }
    }
}

impl FormatOptions {
    /// Render `amount`. Zero amounts are "not applicable" and yield `None`.
    pub fn monetary_amount(
        &self,
        amount: &TokenAmount,
        total: Option<&TokenAmount>,
        symbol: &str,
        token_price_usd: f64,
    ) -> Option<MonetaryAmount> {
        if amount.is_zero() {
            return None;
        }

        let token_value = amount.to_f64();
        let token_number = millify(token_value, self.token_precision);
        let usd_number = millify(token_value * token_price_usd, self.usd_precision);

        Some(MonetaryAmount {
            token_raw: amount.raw().to_str_radix(10),
            token_formatted: format!("{} {}", token_number, symbol),
            token_number,
            usd_formatted: format!("{}$", usd_number),
            usd_number,
            percentage_of_total: total.and_then(|total| self.percentage_of(amount, total)),
        })
    }

    fn percentage_of(&self, amount: &TokenAmount, total: &TokenAmount) -> Option<String> {
        if total.is_zero() {
            return None;
        }
        let share = amount.raw().to_f64()? / total.raw().to_f64()? * 100.0;
        if !share.is_finite() {
            return None;
        }
        Some(format!("{}%", millify(share, self.percentage_precision)))
    }
}
