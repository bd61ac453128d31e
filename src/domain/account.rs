//! Account-scoped passthrough types.
//!
//! These mirror the exchange's own response shapes closely; the gateway
//! serializes them back out without interpretation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account balance snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub collateral_name: String,
    pub balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for_trade: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrealised_pnl: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Leverage currently configured for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLeverage {
    pub market: String,
    pub leverage: Decimal,
}

/// An open or historical position. Kept loose on purpose: only the fields
/// the gateway never touches differ across exchange versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub market: String,
    pub side: String,
    pub size: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realised_pnl: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrealised_pnl: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An open order in the shape the gateway expects from the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: u64,
    pub market: String,
    pub side: String,
    pub qty: Decimal,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Open-orders listing, with an explicit degraded variant.
///
/// When the exchange response no longer matches [`OpenOrder`], the adapter
/// falls back to returning the unparsed body instead of failing the request.
#[derive(Debug, Clone)]
pub enum OpenOrders {
    Parsed(Vec<OpenOrder>),
    Raw(serde_json::Value),
}
