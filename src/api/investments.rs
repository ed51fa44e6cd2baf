use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{Address, InvestmentEvent, ViewState};
use crate::engine::ReconcileAnomaly;
use crate::error::AppError;
use crate::orchestration::InvestmentOverview;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentsQuery {
    pub investor: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentsResponse {
    pub investor: Address,
    pub balance: String,
    pub ownership_share: String,
    pub unit_value: String,
    pub holdings_value: String,
    pub total_cost_basis: String,
    pub total_units_acquired: String,
    pub unrealized_gain: String,
    /// `None` when no cost basis is on the books.
    pub unrealized_gain_percent: Option<String>,
    pub events: Vec<InvestmentEventDto>,
    pub anomalies: Vec<ReconcileAnomaly>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentEventDto {
    pub kind: String,
    pub block_number: u64,
    pub transaction_hash: String,
    pub tx_url: String,
    pub usdc_amount: String,
    pub units: String,
}

fn event_dto(state: &AppState, event: &InvestmentEvent) -> InvestmentEventDto {
    InvestmentEventDto {
        kind: event.kind.label().to_string(),
        block_number: event.block_number.as_u64(),
        transaction_hash: event.transaction_hash.to_string(),
        tx_url: state.tx_url(&event.transaction_hash),
        usdc_amount: event.usdc_amount.to_fixed_string(2),
        units: event.units_delta.to_canonical_string(),
    }
}

fn response(state: &AppState, overview: InvestmentOverview) -> InvestmentsResponse {
    let events = overview
        .events
        .iter()
        .map(|e| event_dto(state, e))
        .collect();

    InvestmentsResponse {
        investor: overview.holding.investor,
        balance: overview.holding.balance.to_canonical_string(),
        ownership_share: overview.holding.ownership_share.to_fixed_string(2),
        unit_value: overview.unit_value.to_canonical_string(),
        holdings_value: overview.gains.holdings_value.to_fixed_string(2),
        total_cost_basis: overview.position.total_cost_basis.to_fixed_string(2),
        total_units_acquired: overview.position.total_units_acquired.to_canonical_string(),
        unrealized_gain: overview.gains.unrealized_gain.to_fixed_string(2),
        unrealized_gain_percent: overview
            .gains
            .unrealized_gain_percent
            .value()
            .map(|p| p.to_fixed_string(2)),
        events,
        anomalies: overview.anomalies,
    }
}

pub async fn get_investments(
    query: Result<Query<InvestmentsQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<ViewState<InvestmentsResponse>>, AppError> {
    let Query(params) = query?;
    let investor = Address::from_str(&params.investor)
        .map_err(|_| AppError::BadRequest("Invalid investor address".into()))?;

    let view = state.dashboard.investment_view(&investor).await;
    Ok(Json(view.map(|overview| response(&state, overview))))
}
