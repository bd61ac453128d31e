//! HTTP surface: router construction and shared state.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::TradingConfig;
use crate::exchange::ExchangeClient;
use crate::service::OrderNormalizer;

pub mod error;
pub mod handlers;

/// Process-wide state shared by every request task: one exchange client
/// handle built at startup, threaded through axum state rather than held as
/// a global.
#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<dyn ExchangeClient>,
    pub orders: Arc<OrderNormalizer>,
}

impl AppState {
    pub fn new(exchange: Arc<dyn ExchangeClient>, trading: TradingConfig) -> Self {
        let orders = Arc::new(OrderNormalizer::new(Arc::clone(&exchange), trading));
        Self { exchange, orders }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/place_order", post(handlers::place_order))
        .route("/account_details", get(handlers::account_details))
        .route("/leverage", get(handlers::leverage))
        .route("/open_positions", get(handlers::open_positions))
        .route("/closed_positions", get(handlers::closed_positions))
        .route("/orders", get(handlers::orders))
        .route("/set_take_profit", post(handlers::set_take_profit))
        .route("/set_stop_loss", post(handlers::set_stop_loss))
        .route("/markets", get(handlers::markets))
        .route("/markets/:market_name/statistics", get(handlers::market_statistics))
        .route("/markets/:market_name/config", get(handlers::market_config))
        .with_state(state)
}
