//! Portfolio rebalancing events.

use crate::domain::{BlockNumber, Decimal, TxHash};
use serde::{Deserialize, Serialize};

/// Names of the mimicked assets, in contract order.
pub const ASSET_NAMES: [&str; 3] = ["Mimic Gold (mXAU)", "Mimic WBTC (mWBTC)", "Mimic ETH (mETH)"];

/// New target allocation written by one rebalancing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub block_number: BlockNumber,
    pub log_index: u64,
    pub transaction_hash: TxHash,
    /// Allocation percentages for mXAU, mWBTC, mETH.
    pub allocations: [Decimal; 3],
}
