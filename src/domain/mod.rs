//! Exchange-agnostic domain types and arithmetic.

pub mod account;
pub mod market;
pub mod order;
pub mod rounding;

pub use account::{Balance, MarketLeverage, OpenOrder, OpenOrders, Position};
pub use market::{Market, MarketOverview, MarketStats, MarketTradingConfig, StatisticsField};
pub use order::{
    AttachmentOutcome, NormalizedOrder, OrderRequest, OrderType, PlacedOrder, PlacementResult,
    Side, TimeInForce,
};
pub use rounding::round_to_step;
