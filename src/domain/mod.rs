//! Domain types and determinism layer for the portfolio ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper and centralized scales
//! - Domain primitives: Address, TxHash, BlockNumber
//! - Investment and rebalancing events decoded from contract logs
//! - Stable log ordering for deterministic replay
//! - Tri-state view status for the display layer

pub mod decimal;
pub mod event;
pub mod ordering;
pub mod primitives;
pub mod rebalance;
pub mod scale;
pub mod snapshot;
pub mod status;

pub use decimal::Decimal;
pub use event::{EventKind, InvestmentEvent};
pub use ordering::LogOrderingKey;
pub use primitives::{Address, AddressParseError, BlockNumber, TxHash};
pub use rebalance::RebalanceEvent;
pub use scale::{Scale, ScaleError};
pub use snapshot::{AssetAllocation, InvestorHolding, PortfolioSnapshot};
pub use status::{Metric, ViewState};
