use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::rebalance::ASSET_NAMES;
use crate::domain::ViewState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceDto {
    pub block_number: u64,
    pub transaction_hash: String,
    pub tx_url: String,
    pub allocations: Vec<RebalanceAllocationDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceAllocationDto {
    pub asset: String,
    pub percent: String,
}

pub async fn get_rebalances(State(state): State<AppState>) -> Json<ViewState<Vec<RebalanceDto>>> {
    let view = state.dashboard.rebalance_view().await;
    Json(view.map(|events| {
        events
            .iter()
            .map(|e| RebalanceDto {
                block_number: e.block_number.as_u64(),
                transaction_hash: e.transaction_hash.to_string(),
                tx_url: state.tx_url(&e.transaction_hash),
                allocations: ASSET_NAMES
                    .iter()
                    .zip(e.allocations.iter())
                    .map(|(asset, percent)| RebalanceAllocationDto {
                        asset: asset.to_string(),
                        percent: percent.to_fixed_string(2),
                    })
                    .collect(),
            })
            .collect()
    }))
}
