//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Provides canonical parsing from strings, construction from raw on-chain
//! integers at a fixed scale, and formatting without exponent notation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal numeric type for ledger calculations.
///
/// Backed by rust_decimal to avoid floating-point drift.
/// Serializes to a JSON string so 18-decimal token amounts survive transport.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::str")] RustDecimal);

impl Decimal {
    /// Create a Decimal from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Interpret `raw` as a fixed-point integer with `scale` fractional digits.
    ///
    /// Returns `None` when the value does not fit the 96-bit mantissa.
    pub fn from_raw_units(raw: u128, scale: u32) -> Option<Self> {
        let signed = i128::try_from(raw).ok()?;
        RustDecimal::try_from_i128_with_scale(signed, scale)
            .ok()
            .map(|d| Decimal(d.normalize()))
    }

    /// Inverse of [`Decimal::from_raw_units`].
    ///
    /// Returns `None` for negative values, values carrying more than `scale`
    /// fractional digits, or values too large to scale.
    pub fn to_raw_units(&self, scale: u32) -> Option<u128> {
        if self.is_negative() {
            return None;
        }
        let factor = RustDecimal::from_i128_with_scale(10i128.checked_pow(scale)?, 0);
        let scaled = self.0.checked_mul(factor)?;
        if scaled.fract() != RustDecimal::ZERO {
            return None;
        }
        scaled.to_u128()
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        // Use normalize() to remove trailing zeros, then format without exponent
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Format with exactly `dp` fractional digits, rounding half away from zero.
    pub fn to_fixed_string(&self, dp: u32) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.*}", dp as usize, rounded)
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// The multiplicative identity (1).
    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    /// Returns the value 100.
    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Round to `dp` fractional digits, half away from zero.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn checked_add(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    pub fn checked_sub(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    pub fn checked_mul(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// Checked division; `None` on a zero divisor or overflow.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

// Arithmetic operations
impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_decimal_canonical_no_exponent() {
        let formatted = d("123").to_canonical_string();
        assert!(!formatted.contains('e'));
        assert_eq!(formatted, "123");
        assert_eq!(d("1.2300").to_canonical_string(), "1.23");
    }

    #[test]
    fn test_decimal_arithmetic() {
        let a = d("10.5");
        let b = d("2.5");
        assert_eq!((a + b).to_canonical_string(), "13");
        assert_eq!((a - b).to_canonical_string(), "8");
        assert_eq!((a * b).to_canonical_string(), "26.25");
        assert_eq!((a / b).to_canonical_string(), "4.2");
    }

    #[test]
    fn test_decimal_json_serialization_is_string() {
        let json = serde_json::to_value(d("123.456")).unwrap();
        assert_eq!(json, serde_json::json!("123.456"));
    }

    #[test]
    fn test_from_raw_units_usdc_and_token_scales() {
        assert_eq!(Decimal::from_raw_units(1_500_000, 6), Some(d("1.5")));
        assert_eq!(
            Decimal::from_raw_units(2_000_000_000_000_000_000, 18),
            Some(d("2"))
        );
        assert_eq!(Decimal::from_raw_units(1, 18), Some(d("0.000000000000000001")));
    }

    #[test]
    fn test_from_raw_units_rejects_oversized_mantissa() {
        assert_eq!(Decimal::from_raw_units(u128::MAX, 18), None);
        assert_eq!(Decimal::from_raw_units(1u128 << 100, 0), None);
    }

    #[test]
    fn test_to_raw_units() {
        assert_eq!(d("25.5").to_raw_units(6), Some(25_500_000));
        assert_eq!(d("50").to_raw_units(4), Some(500_000));
        assert_eq!(d("0.0000001").to_raw_units(6), None);
        assert_eq!(d("-1").to_raw_units(6), None);
    }

    #[test]
    fn test_to_fixed_string() {
        assert_eq!(d("12.345").to_fixed_string(2), "12.35");
        assert_eq!(d("7").to_fixed_string(2), "7.00");
        assert_eq!(d("-0.005").to_fixed_string(2), "-0.01");
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert_eq!(d("1").checked_div(Decimal::zero()), None);
        assert_eq!(d("300").checked_div(d("20")), Some(d("15")));
    }

    #[test]
    fn test_decimal_ordering() {
        assert!(d("10") < d("20"));
        assert!(d("-1").is_negative());
        assert!(!Decimal::zero().is_positive());
    }
}
