//! Mock chain source for testing without network calls.

use super::abi::{self, IPortfolioManager};
use super::{ChainSource, ChainSourceError, LogFilter, RawLog};
use crate::domain::{Address, BlockNumber, EventKind};
use alloy_primitives::U256;
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::collections::HashMap;

/// Mock chain source that serves predefined logs and call results.
#[derive(Debug, Clone, Default)]
pub struct MockChainSource {
    latest_block: u64,
    logs: Vec<RawLog>,
    calls: HashMap<Vec<u8>, Vec<u8>>,
    failure: Option<String>,
}

impl MockChainSource {
    /// Create a new mock chain source with no data.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latest_block(mut self, block: u64) -> Self {
        self.latest_block = block;
        self
    }

    /// Add a raw log.
    pub fn with_log(mut self, log: RawLog) -> Self {
        self.latest_block = self.latest_block.max(log.block_number.as_u64());
        self.logs.push(log);
        self
    }

    /// Add an `Invested` or `Redeemed` log with raw (unscaled) amounts.
    #[allow(clippy::too_many_arguments)]
    pub fn with_investment_log(
        self,
        contract: &Address,
        kind: EventKind,
        investor: &Address,
        raw_usdc: u128,
        raw_units: u128,
        block: u64,
        log_index: u64,
    ) -> Self {
        let log = RawLog {
            address: contract.clone(),
            topics: vec![
                abi::investment_topic(kind),
                investor.to_topic(),
                U256::from(raw_usdc).into(),
                U256::from(raw_units).into(),
            ],
            data: Vec::new(),
            block_number: BlockNumber::new(block),
            log_index,
            transaction_hash: synthetic_tx_hash(block, log_index),
        };
        self.with_log(log)
    }

    /// Add a `PortfolioRebalanced` log with raw (1e4-scaled) allocations.
    pub fn with_rebalance_log(
        self,
        contract: &Address,
        raw_allocations: [u128; 3],
        block: u64,
        log_index: u64,
    ) -> Self {
        let mut topics = vec![abi::rebalance_topic()];
        topics.extend(raw_allocations.iter().map(|a| alloy_primitives::B256::from(U256::from(*a))));
        let log = RawLog {
            address: contract.clone(),
            topics,
            data: Vec::new(),
            block_number: BlockNumber::new(block),
            log_index,
            transaction_hash: synthetic_tx_hash(block, log_index),
        };
        self.with_log(log)
    }

    /// Serve `result` for calls whose calldata is exactly `call` encoded.
    pub fn with_call<C: SolCall>(mut self, call: &C, result: Vec<u8>) -> Self {
        self.calls.insert(call.abi_encode(), result);
        self
    }

    /// Serve a single `uint256` for `call`.
    pub fn with_uint_return<C: SolCall>(self, call: &C, value: u128) -> Self {
        self.with_call(call, U256::from(value).abi_encode())
    }

    /// Serve `balanceOf` and `getOwnershipShare` for one investor.
    pub fn with_holding(self, investor: &Address, raw_balance: u128, raw_share: u128) -> Self {
        let account = alloy_primitives::Address::from(investor);
        self.with_uint_return(&IPortfolioManager::balanceOfCall { account }, raw_balance)
            .with_uint_return(
                &IPortfolioManager::getOwnershipShareCall { investor: account },
                raw_share,
            )
    }

    /// Serve `getCurrentAllocations` as parallel name and raw amount arrays.
    pub fn with_current_allocations(self, names: &[&str], raw: &[u128]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let raw: Vec<U256> = raw.iter().map(|v| U256::from(*v)).collect();
        self.with_call(
            &IPortfolioManager::getCurrentAllocationsCall {},
            (names, raw).abi_encode_params(),
        )
    }

    /// Serve `calculateAllocations`; only the second array carries targets.
    pub fn with_target_allocations(self, raw: &[u128]) -> Self {
        let amounts = vec![U256::ZERO; raw.len()];
        let raw: Vec<U256> = raw.iter().map(|v| U256::from(*v)).collect();
        self.with_call(
            &IPortfolioManager::calculateAllocationsCall {},
            (amounts, raw).abi_encode_params(),
        )
    }

    /// Make every request fail with a network error.
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    fn check_failure(&self) -> Result<(), ChainSourceError> {
        match &self.failure {
            Some(msg) => Err(ChainSourceError::NetworkError(msg.clone())),
            None => Ok(()),
        }
    }
}

fn synthetic_tx_hash(block: u64, log_index: u64) -> String {
    format!("0x{:032x}{:032x}", block, log_index)
}

#[async_trait]
impl ChainSource for MockChainSource {
    async fn latest_block(&self) -> Result<BlockNumber, ChainSourceError> {
        self.check_failure()?;
        Ok(BlockNumber::new(self.latest_block))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, ChainSourceError> {
        self.check_failure()?;
        // Reverse insertion order: callers must not rely on provider ordering.
        Ok(self
            .logs
            .iter()
            .rev()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ChainSourceError> {
        self.check_failure()?;
        self.calls.get(data).cloned().ok_or_else(|| ChainSourceError::RpcError {
            code: 3,
            message: format!("execution reverted: no mock result for call to {}", to),
        })
    }
}
