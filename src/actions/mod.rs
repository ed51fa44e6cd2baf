//! Unsigned call builders for the write paths. Signing and submission happen
//! in the user's wallet.

use crate::config::Config;
use crate::datasource::abi::{self, IPortfolioManager, IERC20};
use crate::domain::{Address, Decimal, Scale};
use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("The minimum investment amount is 1 USDC, got {0}")]
    BelowMinimum(Decimal),
    #[error("{value} has more than {decimals} decimal places")]
    TooPrecise { value: Decimal, decimals: u32 },
    #[error("Redeem percentage must be greater than 0 and at most 100, got {0}")]
    PercentageOutOfRange(Decimal),
}

/// A contract call ready to hand to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub to: Address,
    /// `0x`-prefixed calldata.
    pub data: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ActionBuilder {
    portfolio_manager: Address,
    usdc: Address,
}

impl ActionBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            portfolio_manager: config.portfolio_manager.clone(),
            usdc: config.usdc.clone(),
        }
    }

    /// `invest(amount)` on the portfolio manager. Needs a prior allowance.
    pub fn invest(&self, amount: Decimal) -> Result<CallRequest, ActionError> {
        let raw = usdc_amount(amount)?;
        Ok(CallRequest {
            to: self.portfolio_manager.clone(),
            data: calldata(IPortfolioManager::investCall {
                usdcAmount: U256::from(raw),
            }),
            description: format!("Invest {} USDC", amount),
        })
    }

    /// `increaseAllowance(portfolio_manager, amount)` on the USDC token.
    pub fn approve(&self, amount: Decimal) -> Result<CallRequest, ActionError> {
        let raw = usdc_amount(amount)?;
        Ok(CallRequest {
            to: self.usdc.clone(),
            data: calldata(IERC20::increaseAllowanceCall {
                spender: (&self.portfolio_manager).into(),
                addedValue: U256::from(raw),
            }),
            description: format!(
                "Allow {} to spend {} USDC",
                self.portfolio_manager, amount
            ),
        })
    }

    /// `redeem(percentage × 1e4)` on the portfolio manager.
    pub fn redeem(&self, percentage: Decimal) -> Result<CallRequest, ActionError> {
        if !percentage.is_positive() || percentage > Decimal::hundred() {
            return Err(ActionError::PercentageOutOfRange(percentage));
        }
        let raw = Scale::Percent
            .to_raw(percentage)
            .map_err(|_| ActionError::TooPrecise {
                value: percentage,
                decimals: Scale::Percent.decimals(),
            })?;
        Ok(CallRequest {
            to: self.portfolio_manager.clone(),
            data: calldata(IPortfolioManager::redeemCall {
                percentage: U256::from(raw),
            }),
            description: format!("Redeem {}% of holdings", percentage),
        })
    }
}

fn calldata<C: SolCall>(call: C) -> String {
    abi::encode_hex(&call.abi_encode())
}

fn usdc_amount(amount: Decimal) -> Result<u128, ActionError> {
    if amount < Decimal::one() {
        return Err(ActionError::BelowMinimum(amount));
    }
    Scale::Quote
        .to_raw(amount)
        .map_err(|_| ActionError::TooPrecise {
            value: amount,
            decimals: Scale::Quote.decimals(),
        })
}
