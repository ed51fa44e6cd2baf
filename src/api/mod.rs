pub mod actions;
pub mod health;
pub mod investments;
pub mod portfolio;
pub mod rebalances;

use crate::actions::ActionBuilder;
use crate::config::Config;
use crate::domain::TxHash;
use crate::orchestration::Dashboard;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dashboard: Arc<Dashboard>,
    pub actions: ActionBuilder,
}

impl AppState {
    pub fn new(config: Config, dashboard: Arc<Dashboard>) -> Self {
        Self {
            actions: ActionBuilder::new(&config),
            config,
            dashboard,
        }
    }

    /// Block explorer link for a transaction.
    pub fn tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{}", self.config.explorer_url, tx_hash)
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/portfolio", get(portfolio::get_portfolio))
        .route("/v1/investments", get(investments::get_investments))
        .route("/v1/rebalances", get(rebalances::get_rebalances))
        .route("/v1/actions/invest", get(actions::get_invest))
        .route("/v1/actions/approve", get(actions::get_approve))
        .route("/v1/actions/redeem", get(actions::get_redeem))
        .layer(cors)
        .with_state(state)
}
