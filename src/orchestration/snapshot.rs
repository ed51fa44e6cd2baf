use crate::datasource::abi::{self, AbiError, IPortfolioManager};
use crate::datasource::{ChainSource, ChainSourceError};
use crate::domain::{
    Address, AssetAllocation, Decimal, InvestorHolding, PortfolioSnapshot, Scale, ScaleError,
};
use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum ReadError {
    #[error("state read failed: {0}")]
    Source(#[from] ChainSourceError),
    #[error("state read failed: {function} returned {reason}")]
    Decode {
        function: &'static str,
        reason: String,
    },
}

impl ReadError {
    fn decode(function: &'static str, reason: impl ToString) -> Self {
        ReadError::Decode {
            function,
            reason: reason.to_string(),
        }
    }
}

impl From<(&'static str, AbiError)> for ReadError {
    fn from((function, err): (&'static str, AbiError)) -> Self {
        ReadError::decode(function, err)
    }
}

impl From<(&'static str, ScaleError)> for ReadError {
    fn from((function, err): (&'static str, ScaleError)) -> Self {
        ReadError::decode(function, err)
    }
}

fn scaled(function: &'static str, value: U256, scale: Scale) -> Result<Decimal, ReadError> {
    let raw = abi::to_u128(value).map_err(|e| (function, e))?;
    Ok(scale.normalize(raw).map_err(|e| (function, e))?)
}

/// Reads live portfolio state from the contract's view functions.
#[derive(Clone)]
pub struct PortfolioReader {
    source: Arc<dyn ChainSource>,
    contract: Address,
}

impl PortfolioReader {
    pub fn new(source: Arc<dyn ChainSource>, contract: Address) -> Self {
        Self { source, contract }
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ReadError> {
        debug!(contract = %self.contract, function = C::SIGNATURE, "eth_call");
        let data = self.source.call(&self.contract, &call.abi_encode()).await?;
        Ok(abi::decode_returns::<C>(&data).map_err(|e| (C::SIGNATURE, e))?)
    }

    async fn read_scaled<C: SolCall>(
        &self,
        call: C,
        value: impl FnOnce(C::Return) -> U256,
        scale: Scale,
    ) -> Result<Decimal, ReadError> {
        let ret = self.call(call).await?;
        scaled(C::SIGNATURE, value(ret), scale)
    }

    async fn read_current_allocations(&self) -> Result<Vec<AssetAllocation>, ReadError> {
        let function = IPortfolioManager::getCurrentAllocationsCall::SIGNATURE;
        let ret = self
            .call(IPortfolioManager::getCurrentAllocationsCall {})
            .await?;
        let (names, raw) = (ret._0, ret._1);
        if names.len() != raw.len() {
            return Err(ReadError::decode(
                function,
                format!("{} names for {} percentages", names.len(), raw.len()),
            ));
        }
        names
            .into_iter()
            .zip(raw)
            .map(|(asset, raw)| -> Result<AssetAllocation, ReadError> {
                let percent = scaled(function, raw, Scale::Percent)?;
                Ok(AssetAllocation { asset, percent })
            })
            .collect()
    }

    async fn read_target_allocations(&self) -> Result<Vec<Decimal>, ReadError> {
        let function = IPortfolioManager::calculateAllocationsCall::SIGNATURE;
        let ret = self
            .call(IPortfolioManager::calculateAllocationsCall {})
            .await?;
        // Second array holds the percentages; the first is per-asset amounts.
        ret._1
            .into_iter()
            .map(|raw| scaled(function, raw, Scale::Percent))
            .collect()
    }

    /// Read every portfolio-wide figure concurrently.
    pub async fn read_snapshot(&self) -> Result<PortfolioSnapshot, ReadError> {
        let (total_value, unit_value, total_supply, current_allocations, target_allocations) =
            futures::try_join!(
                self.read_scaled(
                    IPortfolioManager::getTotalPortfolioUsdcValueCall {},
                    |r| r._0,
                    Scale::Quote
                ),
                self.read_scaled(
                    IPortfolioManager::tokenValueInUsdc6DecCall {},
                    |r| r._0,
                    Scale::Quote
                ),
                self.read_scaled(IPortfolioManager::totalSupplyCall {}, |r| r._0, Scale::Unit),
                self.read_current_allocations(),
                self.read_target_allocations(),
            )?;

        Ok(PortfolioSnapshot {
            total_value,
            unit_value,
            total_supply,
            current_allocations,
            target_allocations,
        })
    }

    /// Read one investor's balance and ownership share.
    pub async fn read_holding(&self, investor: &Address) -> Result<InvestorHolding, ReadError> {
        let account = alloy_primitives::Address::from(investor);
        let (balance, ownership_share) = futures::try_join!(
            self.read_scaled(
                IPortfolioManager::balanceOfCall { account },
                |r| r._0,
                Scale::Unit
            ),
            // Ownership share comes back with six decimals, same as USDC.
            self.read_scaled(
                IPortfolioManager::getOwnershipShareCall { investor: account },
                |r| r._0,
                Scale::Quote
            ),
        )?;

        Ok(InvestorHolding {
            investor: investor.clone(),
            balance,
            ownership_share,
        })
    }
}
