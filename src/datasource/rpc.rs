//! Ethereum JSON-RPC client implementation.

use super::abi;
use super::{ChainSource, ChainSourceError, LogFilter, RawLog};
use crate::domain::{Address, BlockNumber};
use alloy_primitives::B256;
use async_trait::async_trait;
use reqwest::Client;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Chain source backed by a JSON-RPC endpoint (`eth_blockNumber`,
/// `eth_getLogs`, `eth_call`).
#[derive(Debug)]
pub struct RpcChainSource {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl RpcChainSource {
    /// Create a new JSON-RPC chain source.
    pub fn new(rpc_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            rpc_url,
            next_id: AtomicU64::new(1),
        }
    }

    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ChainSourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(ChainSourceError::HttpError {
                status: 429,
                message: "Rate limited".to_string(),
            });
        }
        if status.is_server_error() {
            return Err(ChainSourceError::HttpError {
                status: status.as_u16(),
                message: "Server error".to_string(),
            });
        }
        if !status.is_success() {
            return Err(ChainSourceError::HttpError {
                status: status.as_u16(),
                message: "Client error".to_string(),
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ChainSourceError::ParseError(e.to_string()))?;

        extract_result(body)
    }
}

fn extract_result(mut body: serde_json::Value) -> Result<serde_json::Value, ChainSourceError> {
    if let Some(err) = body.get("error") {
        let code = err.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
        let message = err
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(ChainSourceError::RpcError { code, message });
    }
    body.get_mut("result")
        .map(serde_json::Value::take)
        .ok_or_else(|| ChainSourceError::ParseError("Missing result field".to_string()))
}

#[async_trait]
impl ChainSource for RpcChainSource {
    async fn latest_block(&self) -> Result<BlockNumber, ChainSourceError> {
        let result = self
            .request("eth_blockNumber", serde_json::json!([]))
            .await?;
        let quantity = result
            .as_str()
            .ok_or_else(|| ChainSourceError::ParseError("Expected quantity string".to_string()))?;
        parse_quantity(quantity).map(BlockNumber::new)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, ChainSourceError> {
        debug!(
            "Fetching logs for address={}, from_block={}, topics={}",
            filter.address,
            filter.from_block,
            filter.event_topics.len()
        );

        let response = self
            .request("eth_getLogs", serde_json::json!([filter_params(filter)]))
            .await?;

        let logs_json = response
            .as_array()
            .ok_or_else(|| ChainSourceError::ParseError("Expected array response".to_string()))?;

        // One bad record fails the whole fetch; a partial history would
        // reconcile to a wrong cost basis.
        let logs = logs_json
            .iter()
            .map(parse_log)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Fetched {} logs", logs.len());
        Ok(logs)
    }

    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ChainSourceError> {
        let params = serde_json::json!([
            { "to": to.as_str(), "data": abi::encode_hex(data) },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        let hex_str = result
            .as_str()
            .ok_or_else(|| ChainSourceError::ParseError("Expected hex string".to_string()))?;
        abi::decode_hex(hex_str).map_err(|e| ChainSourceError::ParseError(e.to_string()))
    }
}

fn filter_params(filter: &LogFilter) -> serde_json::Value {
    let topic0: Vec<String> = filter
        .event_topics
        .iter()
        .map(|t| abi::encode_hex(t.as_slice()))
        .collect();
    let mut topics = vec![serde_json::json!(topic0)];
    if let Some(topic1) = &filter.topic1 {
        topics.push(serde_json::json!(abi::encode_hex(topic1.as_slice())));
    }
    serde_json::json!({
        "address": filter.address.as_str(),
        "topics": topics,
        "fromBlock": filter.from_block.to_hex_quantity(),
        "toBlock": "latest",
    })
}

fn parse_quantity(s: &str) -> Result<u64, ChainSourceError> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| ChainSourceError::ParseError(format!("Invalid quantity: {}", s)))?;
    u64::from_str_radix(body, 16)
        .map_err(|e| ChainSourceError::ParseError(format!("Invalid quantity {}: {}", s, e)))
}

fn parse_log(log_json: &serde_json::Value) -> Result<RawLog, ChainSourceError> {
    let field = |name: &str| {
        log_json
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChainSourceError::ParseError(format!("Missing {} field", name)))
    };

    let address = Address::from_str(field("address")?)
        .map_err(|e| ChainSourceError::ParseError(format!("Invalid address: {}", e)))?;
    let block_number = parse_quantity(field("blockNumber")?)?;
    let log_index = parse_quantity(field("logIndex")?)?;
    let transaction_hash = field("transactionHash")?.to_string();
    let data = abi::decode_hex(field("data")?)
        .map_err(|e| ChainSourceError::ParseError(format!("Invalid data: {}", e)))?;

    let topics = log_json
        .get("topics")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ChainSourceError::ParseError("Missing topics field".to_string()))?
        .iter()
        .map(|t| {
            t.as_str()
                .ok_or_else(|| ChainSourceError::ParseError("Topic is not a string".to_string()))
                .and_then(|s| {
                    s.parse::<B256>().map_err(|e| {
                        ChainSourceError::ParseError(format!("Invalid topic {}: {}", s, e))
                    })
                })
        })
        .collect::<Result<Vec<B256>, _>>()?;

    Ok(RawLog {
        address,
        topics,
        data,
        block_number: BlockNumber::new(block_number),
        log_index,
        transaction_hash,
    })
}
