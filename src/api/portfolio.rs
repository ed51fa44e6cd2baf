use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::rebalance::ASSET_NAMES;
use crate::domain::ViewState;
use crate::orchestration::PortfolioOverview;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub total_value: String,
    pub unit_value: String,
    pub total_supply: String,
    /// Percent, two decimals.
    pub historical_return: String,
    pub current_allocations: Vec<AllocationDto>,
    pub target_allocations: Vec<AllocationDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDto {
    pub asset: String,
    pub percent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<PortfolioOverview> for PortfolioResponse {
    fn from(overview: PortfolioOverview) -> Self {
        let snapshot = overview.snapshot;
        let current_allocations = overview
            .allocation_values
            .into_iter()
            .map(|a| AllocationDto {
                asset: a.asset,
                percent: a.percent.to_fixed_string(2),
                value: Some(a.value.to_fixed_string(2)),
            })
            .collect();
        let target_allocations = snapshot
            .target_allocations
            .iter()
            .enumerate()
            .map(|(i, percent)| AllocationDto {
                asset: ASSET_NAMES
                    .get(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("Asset {}", i + 1)),
                percent: percent.to_fixed_string(2),
                value: None,
            })
            .collect();

        PortfolioResponse {
            total_value: snapshot.total_value.to_canonical_string(),
            unit_value: snapshot.unit_value.to_canonical_string(),
            total_supply: snapshot.total_supply.to_canonical_string(),
            historical_return: overview.historical_return.to_fixed_string(2),
            current_allocations,
            target_allocations,
        }
    }
}

pub async fn get_portfolio(State(state): State<AppState>) -> Json<ViewState<PortfolioResponse>> {
    let view = state.dashboard.portfolio_view().await;
    Json(view.map(PortfolioResponse::from))
}
