//! Domain primitives: Address, TxHash, BlockNumber.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must have {expected} hex digits, got {actual}")]
    BadLength { expected: usize, actual: usize },
    #[error("address contains non-hex characters")]
    NotHex,
}

fn parse_hex_fixed(input: &str, digits: usize) -> Result<String, AddressParseError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or(AddressParseError::MissingPrefix)?;
    if body.len() != digits {
        return Err(AddressParseError::BadLength {
            expected: digits,
            actual: body.len(),
        });
    }
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressParseError::NotHex);
    }
    Ok(format!("0x{}", body.to_ascii_lowercase()))
}

/// 20-byte account or contract address, stored as lowercase `0x` hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20 bytes.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // Validated at construction.
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(format!("0x{}", hex::encode(bytes)))
    }

    /// The address left-padded to a 32-byte word, as it appears in an indexed topic.
    pub fn to_topic(&self) -> alloy_primitives::B256 {
        alloy_primitives::Address::from(self).into_word()
    }
}

impl From<&Address> for alloy_primitives::Address {
    fn from(address: &Address) -> Self {
        alloy_primitives::Address::from(address.to_bytes())
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(address: alloy_primitives::Address) -> Self {
        Address::from_bytes(address.into_array())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_fixed(s, 40).map(Address)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 32-byte transaction hash. Only used for display and explorer links.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_fixed(s, 64).map(TxHash)
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block height.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    pub fn new(n: u64) -> Self {
        BlockNumber(n)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// `0x`-prefixed quantity encoding used by JSON-RPC.
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl std::fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn test_address_normalizes_case() {
        let addr = Address::from_str("0xABCDEFabcdef0000000000000000000000000001").unwrap();
        assert_eq!(addr.as_str(), "0xabcdefabcdef0000000000000000000000000001");
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert_eq!(
            Address::from_str("1111111111111111111111111111111111111111"),
            Err(AddressParseError::MissingPrefix)
        );
        assert!(matches!(
            Address::from_str("0x123"),
            Err(AddressParseError::BadLength { .. })
        ));
        assert_eq!(
            Address::from_str("0xzz11111111111111111111111111111111111111"),
            Err(AddressParseError::NotHex)
        );
    }

    #[test]
    fn test_address_topic_and_alloy_conversion() {
        let addr = Address::from_str(ADDR).unwrap();
        let topic = addr.to_topic();
        assert!(topic[..12].iter().all(|b| *b == 0));
        assert_eq!(&topic[12..], &addr.to_bytes());

        let converted = alloy_primitives::Address::from(&addr);
        assert_eq!(Address::from(converted), addr);
    }

    #[test]
    fn test_tx_hash_length() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(TxHash::from_str(&hash).is_ok());
        assert!(TxHash::from_str(ADDR).is_err());
    }

    #[test]
    fn test_block_number_hex_quantity() {
        assert_eq!(BlockNumber::new(5916208).to_hex_quantity(), "0x5a4630");
        assert_eq!(BlockNumber::new(0).to_hex_quantity(), "0x0");
    }
}
