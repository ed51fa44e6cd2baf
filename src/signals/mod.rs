//! Rebalancing signals: the weighted sentiment score sent on-chain and the
//! three-word response the data fetcher contract stores.

use crate::datasource::abi;
use crate::domain::Decimal;
use alloy_primitives::U256;
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bearish below this raw score (0.25 scaled by 1e4).
pub const BEARISH_THRESHOLD: u128 = 2_500;
/// Bullish above this raw score (0.75 scaled by 1e4).
pub const BULLISH_THRESHOLD: u128 = 7_500;

const RESPONSE_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalsError {
    #[error("{name} cannot be encoded as uint256: {value}")]
    NotUnsigned { name: &'static str, value: String },
    #[error("{0} overflowed")]
    Overflow(&'static str),
    #[error("response must be {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },
    #[error(transparent)]
    Abi(#[from] abi::AbiError),
    #[error("request failed on-chain: {0}")]
    Remote(String),
}

/// On-chain trading signal scores for one asset, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSignals {
    pub concentration_var: Decimal,
    pub large_txs_var: Decimal,
    pub addresses_net_growth: Decimal,
    pub in_out_var: Decimal,
}

impl TradingSignals {
    /// Weighted score scaled by 1e4 and rounded to an integer.
    pub fn sentiment_score(&self) -> Result<u128, SignalsError> {
        const NAME: &str = "sentiment score";
        let terms = [
            (self.concentration_var, 3),
            (self.large_txs_var, 1),
            (self.addresses_net_growth, 3),
            (self.in_out_var, 3),
        ];
        let mut weighted = Decimal::zero();
        for (value, weight) in terms {
            weighted = value
                .checked_mul(tenths(weight))
                .and_then(|term| weighted.checked_add(term))
                .ok_or(SignalsError::Overflow(NAME))?;
        }
        let scaled = weighted
            .checked_mul(Decimal::from(10_000u64))
            .ok_or(SignalsError::Overflow(NAME))?;
        to_uint(NAME, scaled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bearish,
    Neutral,
    Bullish,
}

pub fn classify(score: u128) -> Sentiment {
    if score < BEARISH_THRESHOLD {
        Sentiment::Bearish
    } else if score > BULLISH_THRESHOLD {
        Sentiment::Bullish
    } else {
        Sentiment::Neutral
    }
}

/// What the fetcher contract receives: two sentiment scores and the gold
/// volatility index scaled by 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub btc_score: u128,
    pub eth_score: u128,
    pub gvz: u128,
}

impl SignalReport {
    pub fn new(
        btc: &TradingSignals,
        eth: &TradingSignals,
        gvz_last: Decimal,
    ) -> Result<Self, SignalsError> {
        Ok(Self {
            btc_score: btc.sentiment_score()?,
            eth_score: eth.sentiment_score()?,
            gvz: to_uint(
                "gvz",
                gvz_last
                    .checked_mul(Decimal::hundred())
                    .ok_or(SignalsError::Overflow("gvz"))?,
            )?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        (
            U256::from(self.btc_score),
            U256::from(self.eth_score),
            U256::from(self.gvz),
        )
            .abi_encode()
    }

    /// Decode a stored response. Empty bytes mean no response yet.
    pub fn decode(data: &[u8]) -> Result<Option<Self>, SignalsError> {
        if data.is_empty() {
            return Ok(None);
        }
        let expected = RESPONSE_WORDS * 32;
        if data.len() != expected {
            return Err(SignalsError::BadLength {
                expected,
                actual: data.len(),
            });
        }
        let (btc, eth, gvz) = <(U256, U256, U256)>::abi_decode(data, true)
            .map_err(abi::AbiError::from)?;
        Ok(Some(Self {
            btc_score: abi::to_u128(btc)?,
            eth_score: abi::to_u128(eth)?,
            gvz: abi::to_u128(gvz)?,
        }))
    }
}

/// Interpret the fetcher's last response/error pair. A non-empty error
/// takes precedence and carries a UTF-8 message.
pub fn read_latest(response: &[u8], error: &[u8]) -> Result<Option<SignalReport>, SignalsError> {
    if !error.is_empty() {
        return Err(SignalsError::Remote(
            String::from_utf8_lossy(error).into_owned(),
        ));
    }
    SignalReport::decode(response)
}

fn tenths(n: i64) -> Decimal {
    Decimal::new(rust_decimal::Decimal::new(n, 1))
}

fn to_uint(name: &'static str, value: Decimal) -> Result<u128, SignalsError> {
    value
        .round_dp(0)
        .to_raw_units(0)
        .ok_or_else(|| SignalsError::NotUnsigned {
            name,
            value: value.to_canonical_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn signals(c: &str, l: &str, a: &str, i: &str) -> TradingSignals {
        TradingSignals {
            concentration_var: d(c),
            large_txs_var: d(l),
            addresses_net_growth: d(a),
            in_out_var: d(i),
        }
    }

    #[test]
    fn test_sentiment_score_weights() {
        // 0.5*0.3 + 1*0.1 + 0.2*0.3 + 0.8*0.3 = 0.55
        let s = signals("0.5", "1", "0.2", "0.8");
        assert_eq!(s.sentiment_score().unwrap(), 5_500);
        assert_eq!(classify(5_500), Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_score_rounds_half_up() {
        // Weights sum to 1, so the raw score is exactly 0.5.
        let s = signals("0.00005", "0.00005", "0.00005", "0.00005");
        assert_eq!(s.sentiment_score().unwrap(), 1);
    }

    #[test]
    fn test_negative_score_rejected() {
        let s = signals("-1", "0", "0", "0");
        assert!(matches!(
            s.sentiment_score(),
            Err(SignalsError::NotUnsigned { .. })
        ));
    }

    #[test]
    fn test_extreme_inputs_overflow_instead_of_panicking() {
        let max = "79228162514264337593543950335";
        let err = SignalReport::new(
            &signals("0", "0", "0", "0"),
            &signals("0", "0", "0", "0"),
            d(max),
        )
        .unwrap_err();
        assert_eq!(err, SignalsError::Overflow("gvz"));

        let s = signals(max, max, max, max);
        assert_eq!(
            s.sentiment_score(),
            Err(SignalsError::Overflow("sentiment score"))
        );
    }

    #[test]
    fn test_decode_rejects_oversized_word() {
        let bytes = (U256::MAX, U256::ZERO, U256::ZERO).abi_encode();
        assert!(matches!(
            SignalReport::decode(&bytes),
            Err(SignalsError::Abi(abi::AbiError::Overflow))
        ));
    }

    #[test]
    fn test_report_encode_decode() {
        let report = SignalReport::new(
            &signals("1", "1", "1", "1"),
            &signals("0", "0", "0", "0.1"),
            d("17.456"),
        )
        .unwrap();
        assert_eq!(report.btc_score, 10_000);
        assert_eq!(report.eth_score, 300);
        assert_eq!(report.gvz, 1_746);

        let bytes = report.encode();
        assert_eq!(bytes.len(), 96);
        assert_eq!(SignalReport::decode(&bytes).unwrap(), Some(report));
    }

    #[test]
    fn test_decode_empty_and_bad_length() {
        assert_eq!(SignalReport::decode(&[]).unwrap(), None);
        assert!(matches!(
            SignalReport::decode(&[0u8; 64]),
            Err(SignalsError::BadLength { .. })
        ));
    }

    #[test]
    fn test_read_latest_error_wins() {
        let err = read_latest(&[], b"HTTP request failed").unwrap_err();
        assert_eq!(
            err.to_string(),
            "request failed on-chain: HTTP request failed"
        );
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(2_499), Sentiment::Bearish);
        assert_eq!(classify(2_500), Sentiment::Neutral);
        assert_eq!(classify(7_501), Sentiment::Bullish);
    }
}
