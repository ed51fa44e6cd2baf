use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::actions::CallRequest;
use crate::api::AppState;
use crate::domain::Decimal;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct PercentageQuery {
    pub percentage: String,
}

fn parse_decimal(name: &str, raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str_canonical(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", name, raw)))
}

pub async fn get_invest(
    query: Result<Query<AmountQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<CallRequest>, AppError> {
    let Query(params) = query?;
    let amount = parse_decimal("amount", &params.amount)?;
    Ok(Json(state.actions.invest(amount)?))
}

pub async fn get_approve(
    query: Result<Query<AmountQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<CallRequest>, AppError> {
    let Query(params) = query?;
    let amount = parse_decimal("amount", &params.amount)?;
    Ok(Json(state.actions.approve(amount)?))
}

pub async fn get_redeem(
    query: Result<Query<PercentageQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<CallRequest>, AppError> {
    let Query(params) = query?;
    let percentage = parse_decimal("percentage", &params.percentage)?;
    Ok(Json(state.actions.redeem(percentage)?))
}
