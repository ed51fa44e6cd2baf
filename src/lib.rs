pub mod actions;
pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod signals;

pub use actions::{ActionBuilder, ActionError, CallRequest};
pub use config::Config;
pub use datasource::{ChainSource, ChainSourceError, MockChainSource, RpcChainSource};
pub use domain::{
    Address, BlockNumber, Decimal, EventKind, InvestmentEvent, Metric, RebalanceEvent, TxHash,
    ViewState,
};
pub use engine::{reconcile, Position, RedemptionPolicy};
pub use error::AppError;
pub use orchestration::{Dashboard, InvestmentSession};
