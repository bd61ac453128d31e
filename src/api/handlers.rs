//! One handler per endpoint. Everything except `/place_order` is a thin
//! passthrough over the exchange client.

use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{MarketLeverage, OpenOrders, OrderRequest, PlacementResult};
use crate::error::Error;
use crate::service::markets::market_overviews;

use super::error::ApiError;
use super::AppState;

/// Repeated-key query parameters (`?market_names=a&market_names=b`).
/// An absent key means "all markets".
pub type RawQuery = Query<Vec<(String, String)>>;

fn market_names(params: &[(String, String)]) -> Vec<String> {
    params
        .iter()
        .filter(|(key, _)| key == "market_names")
        .map(|(_, value)| value.clone())
        .collect()
}

pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<PlacementResult>, ApiError> {
    let result = state.orders.place(request).await?;
    Ok(Json(result))
}

pub async fn account_details(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let balance = state.exchange.get_balance().await?;
    Ok(Json(json!({ "balance": balance })))
}

pub async fn leverage(
    State(state): State<AppState>,
    Query(params): RawQuery,
) -> Result<Json<Vec<MarketLeverage>>, ApiError> {
    let leverage = state.exchange.get_leverage(&market_names(&params)).await?;
    Ok(Json(leverage))
}

pub async fn open_positions(
    State(state): State<AppState>,
    Query(params): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let positions = state.exchange.get_positions(&market_names(&params)).await?;
    Ok(Json(json!({ "data": positions })))
}

pub async fn closed_positions(
    State(state): State<AppState>,
    Query(params): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let history = state
        .exchange
        .get_positions_history(&market_names(&params))
        .await?;
    Ok(Json(json!({ "data": history })))
}

pub async fn orders(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.exchange.get_open_orders().await? {
        OpenOrders::Parsed(orders) => Ok(Json(json!(orders))),
        OpenOrders::Raw(raw) => Ok(Json(json!({ "raw_response": raw }))),
    }
}

#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    pub market_name: String,
    pub price: Decimal,
}

pub async fn set_take_profit(
    State(state): State<AppState>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<Value>, ApiError> {
    let (price, data) = state
        .orders
        .set_take_profit(&request.market_name, request.price)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Take profit set at ${} for {}", price, request.market_name),
        "data": data,
    })))
}

pub async fn set_stop_loss(
    State(state): State<AppState>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<Value>, ApiError> {
    let (price, data) = state
        .orders
        .set_stop_loss(&request.market_name, request.price)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Stop loss set at ${} for {}", price, request.market_name),
        "data": data,
    })))
}

pub async fn markets(
    State(state): State<AppState>,
    Query(params): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let overviews = market_overviews(&state.exchange, &market_names(&params)).await?;
    Ok(Json(json!({
        "count": overviews.len(),
        "data": overviews,
    })))
}

pub async fn market_statistics(
    State(state): State<AppState>,
    Path(market_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let stats = state.exchange.get_market_statistics(&market_name).await?;
    Ok(Json(json!({ "market": market_name, "statistics": stats })))
}

pub async fn market_config(
    State(state): State<AppState>,
    Path(market_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let markets = state
        .exchange
        .get_markets(std::slice::from_ref(&market_name))
        .await?;
    let market = markets
        .into_iter()
        .next()
        .ok_or_else(|| Error::MarketNotFound {
            market: market_name.clone(),
        })?;
    Ok(Json(json!({ "market": market_name, "config": market })))
}
