use crate::config::Config;
use crate::datasource::abi::{self, IPortfolioManager};
use crate::datasource::{ChainSource, ChainSourceError, LogFilter, RawLog};
use crate::domain::ordering::{sort_events_ascending, sort_rebalances_descending};
use crate::domain::{
    Address, BlockNumber, Decimal, EventKind, InvestmentEvent, RebalanceEvent, Scale, TxHash,
};
use alloy_primitives::U256;
use alloy_sol_types::SolEvent;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("log fetch failed: {0}")]
    Source(#[from] ChainSourceError),
    #[error("log fetch failed: undecodable log in tx {tx_hash}: {reason}")]
    Decode { tx_hash: String, reason: String },
}

impl FetchError {
    fn decode(log: &RawLog, reason: impl ToString) -> Self {
        FetchError::Decode {
            tx_hash: log.transaction_hash.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Pulls contract logs and turns them into typed, ordered events.
#[derive(Clone)]
pub struct EventIngestor {
    source: Arc<dyn ChainSource>,
    contract: Address,
    deployment_block: BlockNumber,
    rebalance_window_blocks: u64,
}

impl EventIngestor {
    pub fn new(source: Arc<dyn ChainSource>, config: &Config) -> Self {
        Self {
            source,
            contract: config.portfolio_manager.clone(),
            deployment_block: config.deployment_block,
            rebalance_window_blocks: config.rebalance_window_blocks(),
        }
    }

    /// All `Invested`/`Redeemed` events since deployment, oldest first.
    ///
    /// With an investor, the filter is pushed down as topic1 and applied again
    /// on the returned logs.
    pub async fn fetch_investment_events(
        &self,
        investor: Option<&Address>,
    ) -> Result<Vec<InvestmentEvent>, FetchError> {
        let topics = vec![
            abi::investment_topic(EventKind::Invested),
            abi::investment_topic(EventKind::Redeemed),
        ];
        let mut filter = LogFilter::new(self.contract.clone(), topics, self.deployment_block);
        if let Some(who) = investor {
            filter = filter.with_topic1(who.to_topic());
        }

        debug!(
            contract = %self.contract,
            from_block = %self.deployment_block,
            investor = ?investor.map(Address::as_str),
            "Fetching investment logs"
        );

        let logs = self.source.get_logs(&filter).await?;
        let fetched = logs.len();

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            let event = decode_investment_log(log)?;
            if investor.map_or(true, |who| &event.investor == who) {
                events.push(event);
            }
        }
        sort_events_ascending(&mut events);

        info!(
            "Ingested {} investment events ({} logs fetched)",
            events.len(),
            fetched
        );
        Ok(events)
    }

    pub async fn chain_head(&self) -> Result<BlockNumber, FetchError> {
        Ok(self.source.latest_block().await?)
    }

    /// `PortfolioRebalanced` events inside the trailing window, newest first.
    pub async fn fetch_rebalances(&self) -> Result<Vec<RebalanceEvent>, FetchError> {
        let latest = self.chain_head().await?;
        let from_block =
            BlockNumber::new(latest.as_u64().saturating_sub(self.rebalance_window_blocks));

        debug!(
            contract = %self.contract,
            from_block = %from_block,
            latest = %latest,
            "Fetching rebalance logs"
        );

        let filter = LogFilter::new(
            self.contract.clone(),
            vec![abi::rebalance_topic()],
            from_block,
        );
        let logs = self.source.get_logs(&filter).await?;

        let mut events = logs
            .iter()
            .map(decode_rebalance_log)
            .collect::<Result<Vec<_>, _>>()?;
        sort_rebalances_descending(&mut events);
        Ok(events)
    }
}

fn amount(log: &RawLog, value: U256, scale: Scale) -> Result<Decimal, FetchError> {
    let raw = abi::to_u128(value).map_err(|e| FetchError::decode(log, e))?;
    scale.normalize(raw).map_err(|e| FetchError::decode(log, e))
}

fn tx_hash(log: &RawLog) -> Result<TxHash, FetchError> {
    TxHash::from_str(&log.transaction_hash).map_err(|e| FetchError::decode(log, e))
}

fn decode<E: SolEvent>(log: &RawLog) -> Result<E, FetchError> {
    abi::decode_event::<E>(log).map_err(|e| FetchError::decode(log, e))
}

/// Decode an `Invested`/`Redeemed` log. All three arguments are indexed.
pub fn decode_investment_log(log: &RawLog) -> Result<InvestmentEvent, FetchError> {
    let topic0 = log
        .topics
        .first()
        .ok_or_else(|| FetchError::decode(log, "missing topic 0"))?;

    let (kind, investor, usdc, units) = match *topic0 {
        IPortfolioManager::Invested::SIGNATURE_HASH => {
            let ev = decode::<IPortfolioManager::Invested>(log)?;
            (EventKind::Invested, ev.investor, ev.usdcAmount, ev.tokensMinted)
        }
        IPortfolioManager::Redeemed::SIGNATURE_HASH => {
            let ev = decode::<IPortfolioManager::Redeemed>(log)?;
            (EventKind::Redeemed, ev.investor, ev.usdcAmount, ev.tokensBurned)
        }
        _ => return Err(FetchError::decode(log, "unknown event topic")),
    };

    Ok(InvestmentEvent {
        kind,
        block_number: log.block_number,
        log_index: log.log_index,
        transaction_hash: tx_hash(log)?,
        investor: Address::from(investor),
        usdc_amount: amount(log, usdc, Scale::Quote)?,
        units_delta: amount(log, units, Scale::Unit)?,
    })
}

pub fn decode_rebalance_log(log: &RawLog) -> Result<RebalanceEvent, FetchError> {
    let ev = decode::<IPortfolioManager::PortfolioRebalanced>(log)?;
    Ok(RebalanceEvent {
        block_number: log.block_number,
        log_index: log.log_index,
        transaction_hash: tx_hash(log)?,
        allocations: [
            amount(log, ev.newMimicXAUAllocation, Scale::Percent)?,
            amount(log, ev.newMimicBTCAllocation, Scale::Percent)?,
            amount(log, ev.newMimicETHAllocation, Scale::Percent)?,
        ],
    })
}
