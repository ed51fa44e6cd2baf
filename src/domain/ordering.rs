//! Stable log ordering for deterministic replay.

use crate::domain::{InvestmentEvent, RebalanceEvent};

/// Stable ordering key for chain logs.
///
/// Ordering: block_number -> log_index -> transaction hash
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogOrderingKey {
    /// Block height (primary sort).
    pub block_number: u64,
    /// Index within the block (secondary sort).
    pub log_index: u64,
    /// Transaction hash (fallback sort).
    pub tx_hash: String,
}

impl LogOrderingKey {
    pub fn from_event(event: &InvestmentEvent) -> Self {
        LogOrderingKey {
            block_number: event.block_number.as_u64(),
            log_index: event.log_index,
            tx_hash: event.transaction_hash.as_str().to_string(),
        }
    }

    pub fn from_rebalance(event: &RebalanceEvent) -> Self {
        LogOrderingKey {
            block_number: event.block_number.as_u64(),
            log_index: event.log_index,
            tx_hash: event.transaction_hash.as_str().to_string(),
        }
    }
}

/// Sort events oldest first, the order the reconciler replays them in.
pub fn sort_events_ascending(events: &mut [InvestmentEvent]) {
    events.sort_by_cached_key(LogOrderingKey::from_event);
}

/// Sort events newest first, the order history tables show them in.
pub fn sort_events_descending(events: &mut [InvestmentEvent]) {
    events.sort_by_cached_key(|e| std::cmp::Reverse(LogOrderingKey::from_event(e)));
}

pub fn sort_rebalances_descending(events: &mut [RebalanceEvent]) {
    events.sort_by_cached_key(|e| std::cmp::Reverse(LogOrderingKey::from_rebalance(e)));
}
