//! Exchange port for market data and order execution.
//!
//! This trait is the single integration point with the exchange. Handlers
//! and services only ever see `Arc<dyn ExchangeClient>`, which keeps the
//! order-normalization logic testable against a scripted mock.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    Balance, Market, MarketLeverage, MarketStats, NormalizedOrder, OpenOrders, PlacedOrder,
    Position,
};
use crate::error::Result;

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Live statistics (mark price et al.) for one market.
    async fn get_market_statistics(&self, market: &str) -> Result<MarketStats>;

    /// Market definitions. An empty `market_names` slice means all markets.
    async fn get_markets(&self, market_names: &[String]) -> Result<Vec<Market>>;

    /// Account balance snapshot.
    async fn get_balance(&self) -> Result<Balance>;

    /// Per-market leverage settings.
    async fn get_leverage(&self, market_names: &[String]) -> Result<Vec<MarketLeverage>>;

    /// Currently open positions.
    async fn get_positions(&self, market_names: &[String]) -> Result<Vec<Position>>;

    /// Closed (historical) positions.
    async fn get_positions_history(&self, market_names: &[String]) -> Result<Vec<Position>>;

    /// Open orders, degrading to the raw body on a shape mismatch.
    async fn get_open_orders(&self) -> Result<OpenOrders>;

    /// Set the account-wide leverage for one market.
    ///
    /// This mutates account state, not request state; callers that need
    /// ordering with a subsequent placement must serialize around it.
    async fn update_leverage(&self, market: &str, leverage: Decimal) -> Result<()>;

    /// Submit a normalized order.
    async fn place_order(&self, order: &NormalizedOrder) -> Result<PlacedOrder>;

    /// Attach a take-profit trigger to the position on `market`.
    async fn set_take_profit(&self, market: &str, price: Decimal) -> Result<serde_json::Value>;

    /// Attach a stop-loss trigger to the position on `market`.
    async fn set_stop_loss(&self, market: &str, price: Decimal) -> Result<serde_json::Value>;
}
