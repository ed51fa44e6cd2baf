//! Fixed-point scales used by the portfolio contract.
//!
//! Every raw integer read from the chain goes through [`Scale::normalize`]
//! exactly once, at the decoding boundary.

use crate::domain::Decimal;
use thiserror::Error;

/// USDC (quote currency) decimals.
pub const QUOTE_DECIMALS: u32 = 6;
/// PMT share token decimals.
pub const UNIT_DECIMALS: u32 = 18;
/// Percentages passed to and from the contract (allocations, redeem share).
pub const PERCENT_DECIMALS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Quote currency amounts and per-unit valuations.
    Quote,
    /// Share token amounts.
    Unit,
    /// Percent values scaled by 1e4 (`1_000_000` = 100%).
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    #[error("raw value {raw} does not fit at {decimals} decimals")]
    Overflow { raw: u128, decimals: u32 },
    #[error("value {value} has more than {decimals} fractional digits or is negative")]
    Precision { value: String, decimals: u32 },
}

impl Scale {
    pub fn decimals(&self) -> u32 {
        match self {
            Scale::Quote => QUOTE_DECIMALS,
            Scale::Unit => UNIT_DECIMALS,
            Scale::Percent => PERCENT_DECIMALS,
        }
    }

    pub fn normalize(&self, raw: u128) -> Result<Decimal, ScaleError> {
        Decimal::from_raw_units(raw, self.decimals()).ok_or(ScaleError::Overflow {
            raw,
            decimals: self.decimals(),
        })
    }

    pub fn to_raw(&self, value: Decimal) -> Result<u128, ScaleError> {
        value
            .to_raw_units(self.decimals())
            .ok_or_else(|| ScaleError::Precision {
                value: value.to_canonical_string(),
                decimals: self.decimals(),
            })
    }
}
