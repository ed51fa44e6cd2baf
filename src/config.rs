use crate::domain::{Address, BlockNumber};
use crate::engine::RedemptionPolicy;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Circle's USDC on Sepolia.
pub const DEFAULT_USDC_ADDRESS: &str = "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238";
/// Block the portfolio manager contract was deployed at.
pub const DEFAULT_DEPLOYMENT_BLOCK: u64 = 5_916_208;
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";

const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rpc_url: String,
    pub portfolio_manager: Address,
    pub usdc: Address,
    pub deployment_block: BlockNumber,
    pub rebalance_lookback_days: u64,
    pub block_time_secs: u64,
    pub redemption_policy: RedemptionPolicy,
    pub explorer_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let rpc_url = env_map
            .get("RPC_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("RPC_URL".to_string()))?;

        let portfolio_manager = env_map
            .get("PORTFOLIO_MANAGER_ADDRESS")
            .ok_or_else(|| ConfigError::MissingEnv("PORTFOLIO_MANAGER_ADDRESS".to_string()))
            .and_then(|s| parse_address("PORTFOLIO_MANAGER_ADDRESS", s))?;

        let usdc = parse_address(
            "USDC_ADDRESS",
            env_map
                .get("USDC_ADDRESS")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_USDC_ADDRESS),
        )?;

        let deployment_block = match env_map.get("DEPLOYMENT_BLOCK") {
            Some(s) => parse_u64("DEPLOYMENT_BLOCK", s)?,
            None => DEFAULT_DEPLOYMENT_BLOCK,
        };

        let rebalance_lookback_days = match env_map.get("REBALANCE_LOOKBACK_DAYS") {
            Some(s) => parse_u64("REBALANCE_LOOKBACK_DAYS", s)?,
            None => 10,
        };

        let block_time_secs = match env_map.get("BLOCK_TIME_SECS") {
            Some(s) => parse_u64("BLOCK_TIME_SECS", s)?,
            None => 12,
        };
        if block_time_secs == 0 || block_time_secs > SECONDS_PER_DAY {
            return Err(ConfigError::InvalidValue(
                "BLOCK_TIME_SECS".to_string(),
                format!("must be between 1 and {}", SECONDS_PER_DAY),
            ));
        }

        let redemption_policy = env_map
            .get("REDEMPTION_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("average-cost")
            .parse::<RedemptionPolicy>()
            .map_err(|e| ConfigError::InvalidValue("REDEMPTION_POLICY".to_string(), e))?;

        let explorer_url = env_map
            .get("EXPLORER_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string());

        Ok(Config {
            port,
            rpc_url,
            portfolio_manager,
            usdc,
            deployment_block: BlockNumber::new(deployment_block),
            rebalance_lookback_days,
            block_time_secs,
            redemption_policy,
            explorer_url,
        })
    }

    pub fn blocks_per_day(&self) -> u64 {
        SECONDS_PER_DAY / self.block_time_secs
    }

    /// Width of the rebalancing history window, in blocks.
    pub fn rebalance_window_blocks(&self) -> u64 {
        self.blocks_per_day()
            .saturating_mul(self.rebalance_lookback_days)
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), "must be a valid u64".to_string()))
}
