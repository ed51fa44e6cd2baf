//! Live contract reads: portfolio-wide snapshot and per-investor holding.

use crate::domain::{Address, Decimal};
use serde::{Deserialize, Serialize};

/// One asset's share of the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAllocation {
    pub asset: String,
    /// Percentage of total portfolio value, e.g. `33.33`.
    pub percent: Decimal,
}

/// Portfolio state read at request time. Never derived locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Total portfolio value in USDC.
    pub total_value: Decimal,
    /// USDC value of one PMT.
    pub unit_value: Decimal,
    /// PMT in circulation.
    pub total_supply: Decimal,
    /// Allocation currently held.
    pub current_allocations: Vec<AssetAllocation>,
    /// Allocation the contract would move to on its next rebalance.
    pub target_allocations: Vec<Decimal>,
}

/// An investor's live balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorHolding {
    pub investor: Address,
    /// PMT held.
    pub balance: Decimal,
    /// Ownership share of the portfolio, in percent.
    pub ownership_share: Decimal,
}
