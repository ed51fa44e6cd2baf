//! Contract bindings for the portfolio manager and the USDC token, plus the
//! hex and integer conversions the JSON-RPC layer needs.

use super::RawLog;
use crate::domain::EventKind;
use alloy_primitives::{Bytes, LogData, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use thiserror::Error;

sol! {
    /// Portfolio manager surface the ledger reads from and builds calls for.
    interface IPortfolioManager {
        event Invested(address indexed investor, uint256 indexed usdcAmount, uint256 indexed tokensMinted);
        event Redeemed(address indexed investor, uint256 indexed usdcAmount, uint256 indexed tokensBurned);
        event PortfolioRebalanced(
            uint256 indexed newMimicXAUAllocation,
            uint256 indexed newMimicBTCAllocation,
            uint256 indexed newMimicETHAllocation
        );

        function getTotalPortfolioUsdcValue() external view returns (uint256);
        function tokenValueInUsdc6Dec() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function getCurrentAllocations() external view returns (string[] memory, uint256[] memory);
        function calculateAllocations() external view returns (uint256[] memory, uint256[] memory);
        function balanceOf(address account) external view returns (uint256);
        function getOwnershipShare(address investor) external view returns (uint256);

        function invest(uint256 usdcAmount) external;
        function redeem(uint256 percentage) external;
    }

    interface IERC20 {
        function increaseAllowance(address spender, uint256 addedValue) external returns (bool);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("abi decode failed: {0}")]
    Decode(String),
    #[error("uint256 value exceeds 128 bits")]
    Overflow,
    #[error("invalid hex payload: {0}")]
    Hex(String),
}

impl From<alloy_sol_types::Error> for AbiError {
    fn from(err: alloy_sol_types::Error) -> Self {
        AbiError::Decode(err.to_string())
    }
}

/// topic0 of the log emitted for `kind`.
pub fn investment_topic(kind: EventKind) -> B256 {
    match kind {
        EventKind::Invested => IPortfolioManager::Invested::SIGNATURE_HASH,
        EventKind::Redeemed => IPortfolioManager::Redeemed::SIGNATURE_HASH,
    }
}

pub fn rebalance_topic() -> B256 {
    IPortfolioManager::PortfolioRebalanced::SIGNATURE_HASH
}

/// Decode `log` as event `E`, checking topic0 and the topic count.
pub fn decode_event<E: SolEvent>(log: &RawLog) -> Result<E, AbiError> {
    let data = LogData::new_unchecked(log.topics.clone(), Bytes::from(log.data.clone()));
    Ok(E::decode_log_data(&data, true)?)
}

/// Decode the return data of call `C`.
pub fn decode_returns<C: SolCall>(data: &[u8]) -> Result<C::Return, AbiError> {
    Ok(C::abi_decode_returns(data, true)?)
}

/// Narrow a `uint256` to the widest integer the decimal layer accepts.
pub fn to_u128(value: U256) -> Result<u128, AbiError> {
    u128::try_from(&value).map_err(|_| AbiError::Overflow)
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn decode_hex(input: &str) -> Result<Vec<u8>, AbiError> {
    let body = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(body).map_err(|e| AbiError::Hex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, BlockNumber};
    use alloy_sol_types::SolValue;
    use std::str::FromStr;

    fn investor() -> Address {
        Address::from_str("0x1111111111111111111111111111111111111111").unwrap()
    }

    fn raw_log(topics: Vec<B256>) -> RawLog {
        RawLog {
            address: investor(),
            topics,
            data: Vec::new(),
            block_number: BlockNumber::new(1),
            log_index: 0,
            transaction_hash: format!("0x{:064x}", 1),
        }
    }

    #[test]
    fn test_well_known_selectors() {
        assert_eq!(hex::encode(IPortfolioManager::balanceOfCall::SELECTOR), "70a08231");
        assert_eq!(hex::encode(IPortfolioManager::totalSupplyCall::SELECTOR), "18160ddd");
        assert_eq!(hex::encode(IERC20::increaseAllowanceCall::SELECTOR), "39509351");
    }

    #[test]
    fn test_event_signatures() {
        assert_eq!(
            IPortfolioManager::Invested::SIGNATURE,
            "Invested(address,uint256,uint256)"
        );
        assert_eq!(
            IPortfolioManager::PortfolioRebalanced::SIGNATURE,
            "PortfolioRebalanced(uint256,uint256,uint256)"
        );
        assert_ne!(
            investment_topic(EventKind::Invested),
            investment_topic(EventKind::Redeemed)
        );
    }

    #[test]
    fn test_decode_indexed_event() {
        let log = raw_log(vec![
            investment_topic(EventKind::Redeemed),
            investor().to_topic(),
            U256::from(80_000_000u64).into(),
            U256::from(5u64).into(),
        ]);
        let event: IPortfolioManager::Redeemed = decode_event(&log).unwrap();
        assert_eq!(Address::from(event.investor), investor());
        assert_eq!(to_u128(event.usdcAmount).unwrap(), 80_000_000);
        assert_eq!(to_u128(event.tokensBurned).unwrap(), 5);
    }

    #[test]
    fn test_decode_event_rejects_wrong_topic_and_short_topics() {
        let wrong = raw_log(vec![
            investment_topic(EventKind::Invested),
            investor().to_topic(),
            B256::ZERO,
            B256::ZERO,
        ]);
        assert!(decode_event::<IPortfolioManager::Redeemed>(&wrong).is_err());

        let short = raw_log(vec![investment_topic(EventKind::Invested)]);
        assert!(decode_event::<IPortfolioManager::Invested>(&short).is_err());
    }

    #[test]
    fn test_decode_array_returns() {
        let names = vec!["mXAU".to_string(), "mWBTC".to_string()];
        let raw = vec![U256::from(600_000u64), U256::from(400_000u64)];
        let data = (names.clone(), raw).abi_encode_params();

        let ret = decode_returns::<IPortfolioManager::getCurrentAllocationsCall>(&data).unwrap();
        assert_eq!(ret._0, names);
        assert_eq!(to_u128(ret._1[1]).unwrap(), 400_000);
    }

    #[test]
    fn test_decode_returns_rejects_hostile_offsets() {
        // Head slot points far past the end of the payload.
        let mut data = U256::MAX.abi_encode();
        data.extend(U256::from(64u64).abi_encode());
        assert!(decode_returns::<IPortfolioManager::getCurrentAllocationsCall>(&data).is_err());
        assert!(decode_returns::<IPortfolioManager::totalSupplyCall>(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_to_u128_overflow() {
        assert_eq!(to_u128(U256::from(42u64)).unwrap(), 42);
        assert_eq!(to_u128(U256::MAX), Err(AbiError::Overflow));
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(decode_hex("0x0a0b").unwrap(), vec![10, 11]);
        assert_eq!(encode_hex(&[10, 11]), "0x0a0b");
        assert!(decode_hex("0xzz").is_err());
    }
}
