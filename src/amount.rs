//! Fixed-point amount arithmetic
//!
//! Token amounts stay integers in the token's smallest unit. Ratios are exact
//! fractions of integers. Scaling an amount performs one floor division, so
//! sums of scaled buckets are exact and conversion to `f64` happens only when
//! a value is rendered.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{AllocationError, Result};

/// Denominator of every on-chain split value (10000 = 100%).
pub const SPLIT_SCALE: u32 = 10_000;

/// Fraction digits accepted in a percentage string.
pub const MAX_PERCENTAGE_FRACTION_DIGITS: usize = 18;

/// Exact non-negative ratio `numer / denom`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fraction {
    numer: BigUint,
    denom: BigUint,
}

impl Fraction {
    pub fn one() -> Self {
        Self {
            numer: BigUint::one(),
            denom: BigUint::one(),
        }
    }

    /// Ratio of a split value, e.g. `5000` -> 1/2.
    pub fn from_split(split: u32) -> Self {
        Self {
            numer: BigUint::from(split),
            denom: BigUint::from(SPLIT_SCALE),
        }
    }

    /// `denom` must be non-zero.
    fn new(numer: BigUint, denom: BigUint) -> Self {
        debug_assert!(!denom.is_zero());
        Self { numer, denom }
    }
}

impl Mul for &Fraction {
    type Output = Fraction;

    fn mul(self, rhs: &Fraction) -> Fraction {
        Fraction::new(&self.numer * &rhs.numer, &self.denom * &rhs.denom)
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Fraction) -> Fraction {
        &self * &rhs
    }
}

/// An amount of a token in its smallest unit, tagged with the token precision.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenAmount {
    raw: BigUint,
    decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: BigUint, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(BigUint::zero(), decimals)
    }

    /// Parse a non-negative integer string in smallest units (the way
    /// subgraphs and contracts hand out balances).
    pub fn parse_raw(field: &'static str, value: &str, decimals: u8) -> Result<Self> {
        Ok(Self::new(parse_uint(field, value)?, decimals))
    }

    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// `self * ratio`, rounded down to the smallest unit.
    pub fn scale(&self, ratio: &Fraction) -> Self {
        Self::new(&self.raw * &ratio.numer / &ratio.denom, self.decimals)
    }

    /// Exact decimal rendering in whole tokens, without trailing zeros.
    pub fn to_decimal_string(&self) -> String {
        decimal_string(&self.raw, u32::from(self.decimals))
    }

    /// Whole-token value as a float. Only meant for display.
    pub fn to_f64(&self) -> f64 {
        self.to_decimal_string().parse().unwrap_or(0.0)
    }
}

impl Add for &TokenAmount {
    type Output = TokenAmount;

    fn add(self, rhs: &TokenAmount) -> TokenAmount {
        debug_assert_eq!(self.decimals, rhs.decimals);
        TokenAmount::new(&self.raw + &rhs.raw, self.decimals)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// A non-negative decimal percentage, stored as `units / 10^scale` percent.
#[derive(Clone, Debug)]
pub struct Percentage {
    units: BigUint,
    scale: u32,
}

impl Percentage {
    pub fn hundred() -> Self {
        Self {
            units: BigUint::from(100u32),
            scale: 0,
        }
    }

    pub fn zero() -> Self {
        Self {
            units: BigUint::zero(),
            scale: 0,
        }
    }

    /// A split value (scale 10000) expressed in percent, e.g. `9000` -> 90.
    pub fn from_split(split: u32) -> Self {
        Self {
            units: BigUint::from(split),
            scale: 2,
        }
    }

    /// Parse a plain decimal string such as `"12.5"`.
    ///
    /// Signs, exponents and the `NaN`/`Infinity` spellings are rejected.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AllocationError::invalid_percentage(value, "empty value"));
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AllocationError::invalid_percentage(value, "no digits"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AllocationError::invalid_percentage(
                value,
                "not a decimal number",
            ));
        }
        if frac_part.len() > MAX_PERCENTAGE_FRACTION_DIGITS {
            return Err(AllocationError::invalid_percentage(
                value,
                format!(
                    "more than {} fraction digits",
                    MAX_PERCENTAGE_FRACTION_DIGITS
                ),
            ));
        }

        let digits = format!("{}{}", int_part, frac_part);
        let units = BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| AllocationError::invalid_percentage(value, "not a decimal number"))?;

        Ok(Self {
            units,
            scale: frac_part.len() as u32,
        })
    }

    /// Parse a percentage that must lie in `[0, 100]`.
    pub fn parse_bounded(value: &str) -> Result<Self> {
        let percentage = Self::parse(value)?;
        if percentage > Self::hundred() {
            return Err(AllocationError::invalid_percentage(
                value,
                "must be between 0 and 100",
            ));
        }
        Ok(percentage)
    }

    /// The percentage as a ratio, i.e. divided by 100.
    pub fn to_fraction(&self) -> Fraction {
        Fraction::new(
            self.units.clone(),
            BigUint::from(100u32) * pow10(self.scale),
        )
    }

    fn aligned(&self, scale: u32) -> BigUint {
        &self.units * pow10(scale - self.scale)
    }
}

impl Add for &Percentage {
    type Output = Percentage;

    fn add(self, rhs: &Percentage) -> Percentage {
        let scale = self.scale.max(rhs.scale);
        Percentage {
            units: self.aligned(scale) + rhs.aligned(scale),
            scale,
        }
    }
}

impl PartialEq for Percentage {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Percentage {}

impl PartialOrd for Percentage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Percentage {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.aligned(scale).cmp(&other.aligned(scale))
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&decimal_string(&self.units, self.scale))
    }
}

/// Parse a non-negative base-10 integer.
pub(crate) fn parse_uint(field: &'static str, value: &str) -> Result<BigUint> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AllocationError::InvalidAmount {
            field,
            value: value.to_string(),
        });
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| AllocationError::InvalidAmount {
        field,
        value: value.to_string(),
    })
}

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

fn decimal_string(units: &BigUint, scale: u32) -> String {
    let digits = units.to_str_radix(10);
    if scale == 0 {
        return digits;
    }

    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
