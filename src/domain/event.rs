//! Investment ledger events emitted by the portfolio contract.

use crate::domain::{Address, BlockNumber, Decimal, TxHash};
use serde::{Deserialize, Serialize};

/// Which contract action produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// USDC in, PMT minted.
    Invested,
    /// PMT burned, USDC out.
    Redeemed,
}

impl EventKind {
    /// Short label used in the history table.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Invested => "Invest",
            EventKind::Redeemed => "Redeem",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Invested => write!(f, "invested"),
            EventKind::Redeemed => write!(f, "redeemed"),
        }
    }
}

/// One on-chain action by one investor, with amounts already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentEvent {
    pub kind: EventKind,
    pub block_number: BlockNumber,
    /// Position of the log inside its block.
    pub log_index: u64,
    pub transaction_hash: TxHash,
    pub investor: Address,
    /// Quote currency amount (USDC).
    pub usdc_amount: Decimal,
    /// Share token amount: minted for `Invested`, burned for `Redeemed`.
    pub units_delta: Decimal,
}

impl InvestmentEvent {
    pub fn is_invested(&self) -> bool {
        self.kind == EventKind::Invested
    }

    pub fn is_redeemed(&self) -> bool {
        self.kind == EventKind::Redeemed
    }
}
