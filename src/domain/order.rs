//! Order-related domain types.
//!
//! - [`OrderRequest`] - the inbound simplified order, validated at the boundary
//! - [`NormalizedOrder`] - an exchange-compliant order ready for placement
//! - [`PlacementResult`] - the placement outcome plus optional TP/SL outcomes

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// Time-in-force policy, decided by the normalizer: market orders are
/// immediate-or-cancel, limit orders are good-till-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    Ioc,
    Gtt,
}

/// A simplified order as submitted by the caller.
///
/// `amount` and `usd_value` are both optional at the schema level; the
/// normalizer enforces that exactly one is present so it can report the
/// contradiction with a precise diagnostic instead of a generic parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub market: String,
    pub order_type: OrderType,
    pub side: Side,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub usd_value: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub leverage: Option<Decimal>,
    #[serde(default)]
    pub post_only: Option<bool>,
    #[serde(default)]
    pub take_profit_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss_price: Option<Decimal>,
}

/// An order after precision and bounds enforcement, ready to submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedOrder {
    pub market: String,
    pub side: Side,
    /// Synthetic-asset quantity, a multiple of the market's lot step.
    pub amount: Decimal,
    /// Limit price, a multiple of the market's tick step.
    pub price: Decimal,
    pub time_in_force: TimeInForce,
    pub post_only: bool,
    /// Expiry for GTT orders; `None` for IOC.
    pub expire_time: Option<DateTime<Utc>>,
}

/// Identifiers returned by the exchange for a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacedOrder {
    pub id: u64,
    pub external_id: String,
}

/// Outcome of one conditional (TP or SL) attachment.
///
/// Attachment failures are data, not errors: the parent order is already
/// irreversible by the time these run.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentOutcome {
    pub price: Decimal,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttachmentOutcome {
    pub fn success(price: Decimal) -> Self {
        Self {
            price,
            success: true,
            error: None,
        }
    }

    pub fn failure(price: Decimal, error: impl Into<String>) -> Self {
        Self {
            price,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of a `/place_order` request.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementResult {
    pub order_id: u64,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<AttachmentOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<AttachmentOutcome>,
}
