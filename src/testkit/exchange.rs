//! Scripted [`ExchangeClient`] mock.
//!
//! Responses are configured up front with `with_*` builders; every call is
//! recorded so tests can assert ordering and argument capture. Scripted
//! failures are queued per method and consumed in order, falling back to the
//! configured success response once drained.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    Balance, Market, MarketLeverage, MarketStats, MarketTradingConfig, NormalizedOrder,
    OpenOrders, PlacedOrder, Position,
};
use crate::error::{Error, Result};
use crate::exchange::ExchangeClient;

pub struct MockExchange {
    mark_price: Mutex<Decimal>,
    statistics_errors: Mutex<VecDeque<String>>,
    markets: Mutex<Vec<Market>>,
    markets_errors: Mutex<VecDeque<String>>,
    balance: Mutex<Option<Balance>>,
    leverage: Mutex<Vec<MarketLeverage>>,
    positions: Mutex<Vec<Position>>,
    positions_history: Mutex<Vec<Position>>,
    open_orders: Mutex<Option<OpenOrders>>,
    update_leverage_errors: Mutex<VecDeque<String>>,
    place_order_errors: Mutex<VecDeque<String>>,
    take_profit_errors: Mutex<VecDeque<String>>,
    stop_loss_errors: Mutex<VecDeque<String>>,
    next_order_id: AtomicU64,

    calls: Mutex<Vec<String>>,
    placed_orders: Mutex<Vec<NormalizedOrder>>,
    leverage_updates: Mutex<Vec<(String, Decimal)>>,
    trigger_calls: Mutex<Vec<(String, String, Decimal)>>,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self {
            mark_price: Mutex::new(dec!(100)),
            statistics_errors: Mutex::new(VecDeque::new()),
            markets: Mutex::new(Vec::new()),
            markets_errors: Mutex::new(VecDeque::new()),
            balance: Mutex::new(None),
            leverage: Mutex::new(Vec::new()),
            positions: Mutex::new(Vec::new()),
            positions_history: Mutex::new(Vec::new()),
            open_orders: Mutex::new(None),
            update_leverage_errors: Mutex::new(VecDeque::new()),
            place_order_errors: Mutex::new(VecDeque::new()),
            take_profit_errors: Mutex::new(VecDeque::new()),
            stop_loss_errors: Mutex::new(VecDeque::new()),
            next_order_id: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
            placed_orders: Mutex::new(Vec::new()),
            leverage_updates: Mutex::new(Vec::new()),
            trigger_calls: Mutex::new(Vec::new()),
        }
    }
}

/// Build a market with the given constraints and no passthrough extras.
pub fn market(name: &str, trading_config: MarketTradingConfig) -> Market {
    Market {
        name: name.to_string(),
        trading_config,
        extra: serde_json::Map::new(),
    }
}

/// A representative BTC-style constraint set.
pub fn btc_config() -> MarketTradingConfig {
    MarketTradingConfig {
        min_order_size: dec!(0.001),
        min_order_size_change: dec!(0.001),
        min_price_change: dec!(0.5),
        max_leverage: dec!(20),
    }
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mark_price(self, price: Decimal) -> Self {
        *self.mark_price.lock() = price;
        self
    }

    pub fn with_market(self, market: Market) -> Self {
        self.markets.lock().push(market);
        self
    }

    pub fn with_balance(self, balance: Balance) -> Self {
        *self.balance.lock() = Some(balance);
        self
    }

    pub fn with_leverage(self, leverage: Vec<MarketLeverage>) -> Self {
        *self.leverage.lock() = leverage;
        self
    }

    pub fn with_positions(self, positions: Vec<Position>) -> Self {
        *self.positions.lock() = positions;
        self
    }

    pub fn with_positions_history(self, positions: Vec<Position>) -> Self {
        *self.positions_history.lock() = positions;
        self
    }

    pub fn with_open_orders(self, orders: OpenOrders) -> Self {
        *self.open_orders.lock() = Some(orders);
        self
    }

    pub fn fail_statistics(self, message: &str) -> Self {
        self.statistics_errors.lock().push_back(message.to_string());
        self
    }

    pub fn fail_markets(self, message: &str) -> Self {
        self.markets_errors.lock().push_back(message.to_string());
        self
    }

    pub fn fail_update_leverage(self, message: &str) -> Self {
        self.update_leverage_errors
            .lock()
            .push_back(message.to_string());
        self
    }

    pub fn fail_place_order(self, message: &str) -> Self {
        self.place_order_errors.lock().push_back(message.to_string());
        self
    }

    pub fn fail_take_profit(self, message: &str) -> Self {
        self.take_profit_errors.lock().push_back(message.to_string());
        self
    }

    pub fn fail_stop_loss(self, message: &str) -> Self {
        self.stop_loss_errors.lock().push_back(message.to_string());
        self
    }

    /// Method names in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn placed_orders(&self) -> Vec<NormalizedOrder> {
        self.placed_orders.lock().clone()
    }

    pub fn leverage_updates(&self) -> Vec<(String, Decimal)> {
        self.leverage_updates.lock().clone()
    }

    /// `(kind, market, price)` for every TP/SL call.
    pub fn trigger_calls(&self) -> Vec<(String, String, Decimal)> {
        self.trigger_calls.lock().clone()
    }

    fn record(&self, method: &str) {
        self.calls.lock().push(method.to_string());
    }

    fn scripted_error(queue: &Mutex<VecDeque<String>>) -> Option<Error> {
        queue.lock().pop_front().map(Error::Exchange)
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn get_market_statistics(&self, _market: &str) -> Result<MarketStats> {
        self.record("get_market_statistics");
        if let Some(e) = Self::scripted_error(&self.statistics_errors) {
            return Err(e);
        }
        Ok(MarketStats {
            mark_price: *self.mark_price.lock(),
            index_price: None,
            last_price: None,
            funding_rate: None,
            daily_volume: None,
            extra: serde_json::Map::new(),
        })
    }

    async fn get_markets(&self, market_names: &[String]) -> Result<Vec<Market>> {
        self.record("get_markets");
        if let Some(e) = Self::scripted_error(&self.markets_errors) {
            return Err(e);
        }
        let markets = self.markets.lock();
        if market_names.is_empty() {
            return Ok(markets.clone());
        }
        Ok(markets
            .iter()
            .filter(|m| market_names.contains(&m.name))
            .cloned()
            .collect())
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.record("get_balance");
        self.balance
            .lock()
            .clone()
            .ok_or_else(|| Error::Exchange("no balance configured".into()))
    }

    async fn get_leverage(&self, _market_names: &[String]) -> Result<Vec<MarketLeverage>> {
        self.record("get_leverage");
        Ok(self.leverage.lock().clone())
    }

    async fn get_positions(&self, _market_names: &[String]) -> Result<Vec<Position>> {
        self.record("get_positions");
        Ok(self.positions.lock().clone())
    }

    async fn get_positions_history(&self, _market_names: &[String]) -> Result<Vec<Position>> {
        self.record("get_positions_history");
        Ok(self.positions_history.lock().clone())
    }

    async fn get_open_orders(&self) -> Result<OpenOrders> {
        self.record("get_open_orders");
        Ok(self
            .open_orders
            .lock()
            .clone()
            .unwrap_or(OpenOrders::Parsed(Vec::new())))
    }

    async fn update_leverage(&self, market: &str, leverage: Decimal) -> Result<()> {
        self.record("update_leverage");
        if let Some(e) = Self::scripted_error(&self.update_leverage_errors) {
            return Err(e);
        }
        self.leverage_updates
            .lock()
            .push((market.to_string(), leverage));
        Ok(())
    }

    async fn place_order(&self, order: &NormalizedOrder) -> Result<PlacedOrder> {
        self.record("place_order");
        if let Some(e) = Self::scripted_error(&self.place_order_errors) {
            return Err(e);
        }
        self.placed_orders.lock().push(order.clone());
        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        Ok(PlacedOrder {
            id,
            external_id: format!("ext-{id}"),
        })
    }

    async fn set_take_profit(&self, market: &str, price: Decimal) -> Result<serde_json::Value> {
        self.record("set_take_profit");
        if let Some(e) = Self::scripted_error(&self.take_profit_errors) {
            return Err(e);
        }
        self.trigger_calls
            .lock()
            .push(("take_profit".into(), market.to_string(), price));
        Ok(serde_json::json!({ "market": market, "price": price.to_string() }))
    }

    async fn set_stop_loss(&self, market: &str, price: Decimal) -> Result<serde_json::Value> {
        self.record("set_stop_loss");
        if let Some(e) = Self::scripted_error(&self.stop_loss_errors) {
            return Err(e);
        }
        self.trigger_calls
            .lock()
            .push(("stop_loss".into(), market.to_string(), price));
        Ok(serde_json::json!({ "market": market, "price": price.to_string() }))
    }
}
