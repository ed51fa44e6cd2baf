//! Chain access abstraction: log queries and contract view calls.

use crate::domain::{Address, BlockNumber};
use alloy_primitives::B256;
use async_trait::async_trait;
use std::fmt;

pub mod abi;
pub mod mock;
pub mod rpc;

pub use mock::MockChainSource;
pub use rpc::RpcChainSource;

/// A raw log record as returned by the provider, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub block_number: BlockNumber,
    pub log_index: u64,
    pub transaction_hash: String,
}

/// Log query: one contract, topic0 in `event_topics`, optional topic1 match,
/// blocks from `from_block` to the chain head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub event_topics: Vec<B256>,
    pub topic1: Option<B256>,
    pub from_block: BlockNumber,
}

impl LogFilter {
    pub fn new(address: Address, event_topics: Vec<B256>, from_block: BlockNumber) -> Self {
        Self {
            address,
            event_topics,
            topic1: None,
            from_block,
        }
    }

    pub fn with_topic1(mut self, topic1: B256) -> Self {
        self.topic1 = Some(topic1);
        self
    }

    /// Whether `log` satisfies this filter.
    pub fn matches(&self, log: &RawLog) -> bool {
        if log.address != self.address || log.block_number < self.from_block {
            return false;
        }
        let Some(topic0) = log.topics.first() else {
            return false;
        };
        if !self.event_topics.contains(topic0) {
            return false;
        }
        match &self.topic1 {
            Some(expected) => log.topics.get(1) == Some(expected),
            None => true,
        }
    }
}

/// Chain access used by the ingestors and the portfolio reader.
///
/// Implementations make a single attempt per call; callers decide what a
/// failure means for the current view.
#[async_trait]
pub trait ChainSource: Send + Sync + fmt::Debug {
    /// Latest block number.
    async fn latest_block(&self) -> Result<BlockNumber, ChainSourceError>;

    /// Logs matching the filter, in no guaranteed order.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, ChainSourceError>;

    /// Execute a read-only call against the latest block.
    ///
    /// # Returns
    /// The raw ABI-encoded return data.
    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ChainSourceError>;
}

/// Error type for chain source operations.
#[derive(Debug, Clone)]
pub enum ChainSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// JSON-RPC error object returned by the node
    RpcError { code: i64, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Other error
    Other(String),
}

impl fmt::Display for ChainSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ChainSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            ChainSourceError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            ChainSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ChainSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ChainSourceError {}
