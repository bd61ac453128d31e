//! Order normalization and placement.
//!
//! This is the one piece of real decision-making in the gateway: it turns a
//! loosely-specified [`OrderRequest`] into an exchange-compliant order
//! (lot/tick rounding, leverage bounds, market-order pricing, notional
//! conversion), places it, and attaches optional TP/SL triggers whose
//! individual failure is reported as data rather than failing the request.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::TradingConfig;
use crate::domain::{
    round_to_step, AttachmentOutcome, MarketTradingConfig, NormalizedOrder, OrderRequest,
    OrderType, PlacementResult, Side, TimeInForce,
};
use crate::error::{Error, Result};
use crate::exchange::ExchangeClient;

/// Exchange-imposed leverage floor, common to all markets.
const LEVERAGE_FLOOR: Decimal = Decimal::TWO;

pub struct OrderNormalizer {
    exchange: Arc<dyn ExchangeClient>,
    trading: TradingConfig,
    /// Per-market serialization of the leverage-update + placement pair.
    /// Leverage is account-wide state on the exchange; without this, two
    /// concurrent orders for one market could place under the wrong setting.
    market_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrderNormalizer {
    pub fn new(exchange: Arc<dyn ExchangeClient>, trading: TradingConfig) -> Self {
        Self {
            exchange,
            trading,
            market_locks: DashMap::new(),
        }
    }

    /// Normalize and place an order, then attach any requested TP/SL.
    pub async fn place(&self, request: OrderRequest) -> Result<PlacementResult> {
        // All shape validation happens before the first exchange call.
        let sizing = match (request.amount, request.usd_value) {
            (Some(amount), None) => Sizing::Amount(amount),
            (None, Some(usd_value)) => Sizing::Notional(usd_value),
            _ => {
                return Err(Error::validation(
                    "Provide exactly one of 'amount' or 'usd_value'",
                ))
            }
        };

        let (raw_amount, raw_price, time_in_force, post_only) = match request.order_type {
            OrderType::Market => {
                // One mark-price fetch covers both notional sizing and the
                // IOC crossing price.
                let mark = self
                    .exchange
                    .get_market_statistics(&request.market)
                    .await?
                    .mark_price;
                if mark <= Decimal::ZERO {
                    return Err(Error::Exchange(format!(
                        "mark price {} for {} is not positive",
                        mark, request.market
                    )));
                }
                let amount = match sizing {
                    Sizing::Amount(amount) => amount,
                    Sizing::Notional(usd_value) => usd_value / mark,
                };
                let multiplier = match request.side {
                    Side::Buy => self.trading.buy_price_multiplier,
                    Side::Sell => self.trading.sell_price_multiplier,
                };
                let price = mark * multiplier;
                debug!(mark = %mark, multiplier = %multiplier, price = %price,
                    "market order pricing");
                (amount, price, TimeInForce::Ioc, false)
            }
            OrderType::Limit => {
                let Some(price) = request.price else {
                    return Err(Error::validation("Price required for limit order"));
                };
                if price <= Decimal::ZERO {
                    return Err(Error::validation("Price must be positive"));
                }
                let amount = match sizing {
                    Sizing::Amount(amount) => amount,
                    Sizing::Notional(usd_value) => usd_value / price,
                };
                (
                    amount,
                    price,
                    TimeInForce::Gtt,
                    request.post_only.unwrap_or(false),
                )
            }
        };

        let config = self.trading_config(&request.market).await?;

        let amount = round_to_step(raw_amount, config.min_order_size_change);
        if amount < config.min_order_size {
            return Err(Error::validation(format!(
                "Adjusted amount {} is less than minimum order size {} for {}",
                amount, config.min_order_size, request.market
            )));
        }
        let price = round_to_step(raw_price, config.min_price_change);

        let leverage = request.leverage.unwrap_or(self.trading.default_leverage);
        if leverage < LEVERAGE_FLOOR || leverage > config.max_leverage {
            return Err(Error::validation(format!(
                "Leverage must be between {} and {} for {}",
                LEVERAGE_FLOOR, config.max_leverage, request.market
            )));
        }

        let order = NormalizedOrder {
            market: request.market.clone(),
            side: request.side,
            amount,
            price,
            time_in_force,
            post_only,
            expire_time: match time_in_force {
                TimeInForce::Gtt => {
                    Some(Utc::now() + Duration::days(self.trading.gtt_expiry_days))
                }
                TimeInForce::Ioc => None,
            },
        };

        // Leverage is account-wide: hold the market's lock across the update
        // and the placement so the order executes under its own setting.
        let placed = {
            let lock = self.market_lock(&request.market);
            let _guard = lock.lock().await;
            self.exchange
                .update_leverage(&request.market, leverage)
                .await?;
            self.exchange.place_order(&order).await?
        };
        info!(
            market = %request.market,
            order_id = placed.id,
            amount = %amount,
            price = %price,
            "order placed"
        );

        let take_profit = match request.take_profit_price {
            Some(raw) => Some(
                self.attach(&request.market, raw, &config, Trigger::TakeProfit)
                    .await,
            ),
            None => None,
        };
        let stop_loss = match request.stop_loss_price {
            Some(raw) => Some(
                self.attach(&request.market, raw, &config, Trigger::StopLoss)
                    .await,
            ),
            None => None,
        };

        Ok(PlacementResult {
            order_id: placed.id,
            external_id: placed.external_id,
            take_profit,
            stop_loss,
        })
    }

    /// Tick-round `price` for `market` and set a take-profit trigger.
    /// Used by the standalone endpoint; failures here are plain errors.
    pub async fn set_take_profit(&self, market: &str, price: Decimal) -> Result<(Decimal, serde_json::Value)> {
        let config = self.trading_config(market).await?;
        let price = round_to_step(price, config.min_price_change);
        let data = self.exchange.set_take_profit(market, price).await?;
        Ok((price, data))
    }

    /// Tick-round `price` for `market` and set a stop-loss trigger.
    pub async fn set_stop_loss(&self, market: &str, price: Decimal) -> Result<(Decimal, serde_json::Value)> {
        let config = self.trading_config(market).await?;
        let price = round_to_step(price, config.min_price_change);
        let data = self.exchange.set_stop_loss(market, price).await?;
        Ok((price, data))
    }

    async fn trading_config(&self, market: &str) -> Result<MarketTradingConfig> {
        let markets = self.exchange.get_markets(&[market.to_string()]).await?;
        markets
            .into_iter()
            .next()
            .map(|m| m.trading_config)
            .ok_or_else(|| Error::MarketNotFound {
                market: market.to_string(),
            })
    }

    /// Attach one conditional order, capturing failure as data: the parent
    /// order is already live and cannot be rolled back from here.
    async fn attach(
        &self,
        market: &str,
        raw_price: Decimal,
        config: &MarketTradingConfig,
        trigger: Trigger,
    ) -> AttachmentOutcome {
        let price = round_to_step(raw_price, config.min_price_change);
        let result = match trigger {
            Trigger::TakeProfit => self.exchange.set_take_profit(market, price).await,
            Trigger::StopLoss => self.exchange.set_stop_loss(market, price).await,
        };
        match result {
            Ok(_) => AttachmentOutcome::success(price),
            Err(e) => {
                warn!(market = %market, trigger = ?trigger, error = %e,
                    "conditional attachment failed");
                AttachmentOutcome::failure(price, e.to_string())
            }
        }
    }

    fn market_lock(&self, market: &str) -> Arc<Mutex<()>> {
        self.market_locks
            .entry(market.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// How the caller specified order size.
#[derive(Debug, Clone, Copy)]
enum Sizing {
    /// Synthetic-asset quantity, used as-is pre-rounding.
    Amount(Decimal),
    /// USD notional, converted at the mark (market) or limit price.
    Notional(Decimal),
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    TakeProfit,
    StopLoss,
}
