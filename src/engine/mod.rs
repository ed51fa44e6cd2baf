//! Pure computation engine(s) for deterministic ledger logic.

pub mod reconciler;
pub mod valuation;

pub use reconciler::{
    reconcile, AnomalyKind, Position, PositionReconciler, ReconcileAnomaly, ReconcileError,
    Reconciliation, RedemptionPolicy,
};
pub use valuation::{AllocationValue, GainFigures, ValuationError};
