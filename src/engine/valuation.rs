use crate::domain::scale::QUOTE_DECIMALS;
use crate::domain::{AssetAllocation, Decimal, InvestorHolding, Metric, PortfolioSnapshot};
use crate::engine::reconciler::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    #[error("arithmetic overflow while valuing {0}")]
    Overflow(&'static str),
}

/// Gain figures for one investor, derived from a reconciled position and a
/// live holding read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainFigures {
    pub holdings_value: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_percent: Metric,
}

/// Per-asset allocation with its USDC value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationValue {
    pub asset: String,
    pub percent: Decimal,
    pub value: Decimal,
}

/// USDC value of `balance` PMT at `unit_value`, at quote precision.
pub fn holdings_value(balance: Decimal, unit_value: Decimal) -> Result<Decimal, ValuationError> {
    balance
        .checked_mul(unit_value)
        .map(|v| v.round_dp(QUOTE_DECIMALS))
        .ok_or(ValuationError::Overflow("holdings"))
}

/// `holdings − cost`, or zero when nothing is on the books.
pub fn unrealized_gain(position: &Position, holdings: Decimal) -> Decimal {
    if position.total_cost_basis.is_zero() {
        return Decimal::zero();
    }
    holdings - position.total_cost_basis
}

/// `(holdings / cost − 1) × 100`. Undefined without cost or units.
pub fn unrealized_gain_percent(position: &Position, holdings: Decimal) -> Metric {
    if position.total_cost_basis.is_zero() || position.total_units_acquired.is_zero() {
        return Metric::Unavailable;
    }
    holdings
        .checked_div(position.total_cost_basis)
        .and_then(|ratio| (ratio - Decimal::one()).checked_mul(Decimal::hundred()))
        .into()
}

pub fn evaluate(
    position: &Position,
    holding: &InvestorHolding,
    snapshot: &PortfolioSnapshot,
) -> Result<GainFigures, ValuationError> {
    let holdings = holdings_value(holding.balance, snapshot.unit_value)?;
    Ok(GainFigures {
        holdings_value: holdings,
        unrealized_gain: unrealized_gain(position, holdings),
        unrealized_gain_percent: unrealized_gain_percent(position, holdings),
    })
}

/// Return since launch at 1 USDC per PMT, in percent.
pub fn historical_return(unit_value: Decimal) -> Decimal {
    (unit_value - Decimal::one()) * Decimal::hundred()
}

pub fn allocation_values(
    total_value: Decimal,
    allocations: &[AssetAllocation],
) -> Result<Vec<AllocationValue>, ValuationError> {
    allocations
        .iter()
        .map(|a| {
            let value = total_value
                .checked_mul(a.percent)
                .and_then(|v| v.checked_div(Decimal::hundred()))
                .ok_or(ValuationError::Overflow("allocation"))?;
            Ok(AllocationValue {
                asset: a.asset.clone(),
                percent: a.percent,
                value: value.round_dp(QUOTE_DECIMALS),
            })
        })
        .collect()
}
