use crate::domain::ordering::LogOrderingKey;
use crate::domain::scale::QUOTE_DECIMALS;
use crate::domain::{BlockNumber, Decimal, EventKind, InvestmentEvent, TxHash};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// How a redemption reduces the running cost basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedemptionPolicy {
    /// Debit `units_burned × (cost / units)` taken before the redemption.
    #[default]
    AverageCost,
    /// Debit the USDC amount paid out by the redemption.
    DirectDebit,
}

impl FromStr for RedemptionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average-cost" => Ok(RedemptionPolicy::AverageCost),
            "direct-debit" => Ok(RedemptionPolicy::DirectDebit),
            other => Err(format!(
                "must be average-cost or direct-debit, got {}",
                other
            )),
        }
    }
}

/// Running aggregate for one investor. Recomputed from scratch on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// USDC attributed to the units still held.
    pub total_cost_basis: Decimal,
    /// PMT units still attributed to the investor.
    pub total_units_acquired: Decimal,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_cost_basis.is_zero() && self.total_units_acquired.is_zero()
    }

    /// Cost per unit, undefined with no units.
    pub fn average_cost(&self) -> Option<Decimal> {
        if !self.total_units_acquired.is_positive() {
            return None;
        }
        self.total_cost_basis.checked_div(self.total_units_acquired)
    }
}

/// Something the replay had to correct. Each one points at a data or logic
/// problem worth investigating; none is a valid ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileAnomaly {
    pub block_number: BlockNumber,
    pub transaction_hash: TxHash,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnomalyKind {
    /// Redemption seen with no units on the books; no adjustment applied.
    RedeemWithoutUnits,
    /// Cost basis would have gone negative by `shortfall`.
    CostBasisClamped { shortfall: Decimal },
    /// Unit count would have gone negative by `shortfall`.
    UnitsClamped { shortfall: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("arithmetic overflow while applying {kind} event in tx {tx_hash}")]
    Overflow { kind: EventKind, tx_hash: TxHash },
}

/// Result of replaying one investor's event sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub position: Position,
    pub anomalies: Vec<ReconcileAnomaly>,
}

pub struct PositionReconciler {
    pub state: Position,
    policy: RedemptionPolicy,

    // Outputs accumulated during processing.
    anomalies: Vec<ReconcileAnomaly>,
}

impl PositionReconciler {
    pub fn new(policy: RedemptionPolicy) -> Self {
        Self {
            state: Position::new(),
            policy,
            anomalies: Vec::new(),
        }
    }

    pub fn policy(&self) -> RedemptionPolicy {
        self.policy
    }

    /// Apply one event to the running position.
    ///
    /// Callers must feed events in ascending block order; [`reconcile`] does
    /// the sorting.
    pub fn process_event(&mut self, event: &InvestmentEvent) -> Result<(), ReconcileError> {
        match event.kind {
            EventKind::Invested => self.handle_invested(event),
            EventKind::Redeemed => match self.policy {
                RedemptionPolicy::AverageCost => self.handle_redeemed_average_cost(event),
                RedemptionPolicy::DirectDebit => self.handle_redeemed_direct(event),
            },
        }
    }

    fn overflow(event: &InvestmentEvent) -> ReconcileError {
        ReconcileError::Overflow {
            kind: event.kind,
            tx_hash: event.transaction_hash.clone(),
        }
    }

    fn handle_invested(&mut self, event: &InvestmentEvent) -> Result<(), ReconcileError> {
        self.state.total_cost_basis = self
            .state
            .total_cost_basis
            .checked_add(event.usdc_amount)
            .ok_or_else(|| Self::overflow(event))?;
        self.state.total_units_acquired = self
            .state
            .total_units_acquired
            .checked_add(event.units_delta)
            .ok_or_else(|| Self::overflow(event))?;
        Ok(())
    }

    fn handle_redeemed_average_cost(
        &mut self,
        event: &InvestmentEvent,
    ) -> Result<(), ReconcileError> {
        let Some(average_cost) = self.state.average_cost() else {
            warn!(
                tx = %event.transaction_hash,
                block = %event.block_number,
                "Redemption with no units on the books, skipping cost adjustment"
            );
            self.record(event, AnomalyKind::RedeemWithoutUnits);
            return Ok(());
        };

        let debit = event
            .units_delta
            .checked_mul(average_cost)
            .ok_or_else(|| Self::overflow(event))?
            .round_dp(QUOTE_DECIMALS);

        self.debit(event, debit, event.units_delta);
        Ok(())
    }

    fn handle_redeemed_direct(&mut self, event: &InvestmentEvent) -> Result<(), ReconcileError> {
        self.debit(event, event.usdc_amount, event.units_delta);
        Ok(())
    }

    /// Subtract from both running totals, clamping at zero.
    fn debit(&mut self, event: &InvestmentEvent, cost: Decimal, units: Decimal) {
        let new_cost = self.state.total_cost_basis - cost;
        if new_cost.is_negative() {
            warn!(
                tx = %event.transaction_hash,
                shortfall = %new_cost.abs(),
                "Cost basis would go negative, clamping to zero"
            );
            self.record(
                event,
                AnomalyKind::CostBasisClamped {
                    shortfall: new_cost.abs(),
                },
            );
            self.state.total_cost_basis = Decimal::zero();
        } else {
            self.state.total_cost_basis = new_cost;
        }

        let new_units = self.state.total_units_acquired - units;
        if new_units.is_negative() {
            warn!(
                tx = %event.transaction_hash,
                shortfall = %new_units.abs(),
                "Unit count would go negative, clamping to zero"
            );
            self.record(
                event,
                AnomalyKind::UnitsClamped {
                    shortfall: new_units.abs(),
                },
            );
            self.state.total_units_acquired = Decimal::zero();
        } else {
            self.state.total_units_acquired = new_units;
        }
    }

    fn record(&mut self, event: &InvestmentEvent, kind: AnomalyKind) {
        self.anomalies.push(ReconcileAnomaly {
            block_number: event.block_number,
            transaction_hash: event.transaction_hash.clone(),
            kind,
        });
    }

    /// Get the accumulated outputs.
    pub fn into_outputs(self) -> Reconciliation {
        Reconciliation {
            position: self.state,
            anomalies: self.anomalies,
        }
    }
}

/// Replay `events` oldest first and return the resulting position.
///
/// The input order does not matter; the same events always produce the same
/// position.
pub fn reconcile(
    events: &[InvestmentEvent],
    policy: RedemptionPolicy,
) -> Result<Reconciliation, ReconcileError> {
    let mut ordered: Vec<&InvestmentEvent> = events.iter().collect();
    ordered.sort_by_cached_key(|e| LogOrderingKey::from_event(e));

    let mut reconciler = PositionReconciler::new(policy);
    for event in ordered {
        reconciler.process_event(event)?;
    }
    Ok(reconciler.into_outputs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "average-cost".parse::<RedemptionPolicy>(),
            Ok(RedemptionPolicy::AverageCost)
        );
        assert_eq!(
            "direct-debit".parse::<RedemptionPolicy>(),
            Ok(RedemptionPolicy::DirectDebit)
        );
        assert!("fifo".parse::<RedemptionPolicy>().is_err());
        assert_eq!(RedemptionPolicy::default(), RedemptionPolicy::AverageCost);
    }

    #[test]
    fn test_average_cost_undefined_without_units() {
        let position = Position {
            total_cost_basis: Decimal::from(5u64),
            total_units_acquired: Decimal::zero(),
        };
        assert_eq!(position.average_cost(), None);
        assert!(Position::new().is_empty());
    }
}
