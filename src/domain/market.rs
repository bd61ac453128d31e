//! Market metadata as reported by the exchange.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-market precision, size and leverage constraints.
///
/// Fetched fresh for every request that needs it; the exchange can retune
/// these at any time, so nothing here is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTradingConfig {
    /// Smallest accepted order size.
    pub min_order_size: Decimal,
    /// Lot step: order sizes must be multiples of this.
    pub min_order_size_change: Decimal,
    /// Tick step: prices must be multiples of this.
    pub min_price_change: Decimal,
    /// Market-specific leverage ceiling.
    pub max_leverage: Decimal,
}

/// A tradeable market and its configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    pub trading_config: MarketTradingConfig,
    /// Whatever else the exchange reports (collateral asset, status, fees);
    /// passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Live statistics for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketStats {
    pub mark_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_volume: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Statistics slot in a market overview: either the live numbers or the
/// reason they could not be fetched. One market's statistics failure never
/// aborts the overview batch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatisticsField {
    Available(MarketStats),
    Unavailable { error: String },
}

/// One market's configuration merged with its live statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MarketOverview {
    pub name: String,
    pub config: Market,
    pub statistics: StatisticsField,
}
