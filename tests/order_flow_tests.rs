//! Order normalization and placement behavior, driven through the scripted
//! exchange mock.

use std::sync::Arc;

use rust_decimal_macros::dec;

use perpgate::config::TradingConfig;
use perpgate::domain::{
    MarketTradingConfig, OrderRequest, OrderType, Side, TimeInForce,
};
use perpgate::error::Error;
use perpgate::service::OrderNormalizer;
use perpgate::testkit::{btc_config, market, MockExchange};

fn normalizer(mock: &Arc<MockExchange>) -> OrderNormalizer {
    let exchange: Arc<dyn perpgate::exchange::ExchangeClient> =
        Arc::clone(mock) as Arc<dyn perpgate::exchange::ExchangeClient>;
    OrderNormalizer::new(exchange, TradingConfig::default())
}

fn btc_exchange() -> Arc<MockExchange> {
    Arc::new(MockExchange::new().with_market(market("BTC-USD", btc_config())))
}

fn base_request() -> OrderRequest {
    OrderRequest {
        market: "BTC-USD".into(),
        order_type: OrderType::Market,
        side: Side::Buy,
        amount: Some(dec!(1)),
        usd_value: None,
        price: None,
        leverage: None,
        post_only: None,
        take_profit_price: None,
        stop_loss_price: None,
    }
}

#[tokio::test]
async fn both_amount_and_usd_value_rejected_before_any_exchange_call() {
    let mock = btc_exchange();
    let request = OrderRequest {
        amount: Some(dec!(1)),
        usd_value: Some(dec!(100)),
        ..base_request()
    };

    let err = normalizer(&mock).place(request).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("Provide exactly one of"));
    assert!(mock.calls().is_empty(), "no exchange call expected");
}

#[tokio::test]
async fn neither_amount_nor_usd_value_rejected() {
    let mock = btc_exchange();
    let request = OrderRequest {
        amount: None,
        usd_value: None,
        ..base_request()
    };

    let err = normalizer(&mock).place(request).await.unwrap_err();
    assert!(err.to_string().contains("Provide exactly one of"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn limit_order_without_price_rejected_before_any_exchange_call() {
    let mock = btc_exchange();
    let request = OrderRequest {
        order_type: OrderType::Limit,
        price: None,
        ..base_request()
    };

    let err = normalizer(&mock).place(request).await.unwrap_err();
    assert!(err.to_string().contains("Price required for limit order"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn market_buy_crosses_at_marked_up_tick_rounded_price() {
    let mock = btc_exchange(); // mark price defaults to 100, tick 0.5
    normalizer(&mock).place(base_request()).await.unwrap();

    let placed = mock.placed_orders();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].price, dec!(105)); // 100 * 1.05
    assert_eq!(placed[0].time_in_force, TimeInForce::Ioc);
    assert!(!placed[0].post_only);
    assert!(placed[0].expire_time.is_none());
}

#[tokio::test]
async fn market_sell_uses_the_discount_multiplier() {
    let mock = btc_exchange();
    let request = OrderRequest {
        side: Side::Sell,
        ..base_request()
    };
    normalizer(&mock).place(request).await.unwrap();

    assert_eq!(mock.placed_orders()[0].price, dec!(95)); // 100 * 0.95
}

#[tokio::test]
async fn amount_below_minimum_after_rounding_is_rejected() {
    let config = MarketTradingConfig {
        min_order_size: dec!(0.1),
        min_order_size_change: dec!(0.01),
        min_price_change: dec!(0.5),
        max_leverage: dec!(20),
    };
    let mock = Arc::new(MockExchange::new().with_market(market("BTC-USD", config)));
    let request = OrderRequest {
        amount: Some(dec!(0.014)), // rounds down to 0.01
        ..base_request()
    };

    let err = normalizer(&mock).place(request).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Adjusted amount 0.01"), "got: {msg}");
    assert!(msg.contains("minimum order size 0.1"), "got: {msg}");
    assert!(mock.placed_orders().is_empty());
}

#[tokio::test]
async fn usd_value_market_order_sizes_at_the_mark_price() {
    let mock = Arc::new(
        MockExchange::new()
            .with_mark_price(dec!(50))
            .with_market(market("BTC-USD", btc_config())),
    );
    let request = OrderRequest {
        amount: None,
        usd_value: Some(dec!(500)),
        ..base_request()
    };
    normalizer(&mock).place(request).await.unwrap();

    // 500 / 50 = 10, already a lot multiple
    assert_eq!(mock.placed_orders()[0].amount, dec!(10));
}

#[tokio::test]
async fn usd_value_limit_order_sizes_at_the_limit_price() {
    let mock = btc_exchange();
    let request = OrderRequest {
        order_type: OrderType::Limit,
        amount: None,
        usd_value: Some(dec!(1000)),
        price: Some(dec!(100)),
        ..base_request()
    };
    normalizer(&mock).place(request).await.unwrap();

    let placed = mock.placed_orders();
    assert_eq!(placed[0].amount, dec!(10));
    assert_eq!(placed[0].price, dec!(100));
    assert_eq!(placed[0].time_in_force, TimeInForce::Gtt);
    assert!(placed[0].expire_time.is_some());
}

#[tokio::test]
async fn limit_order_respects_post_only_and_rounds_price_to_tick() {
    let mock = btc_exchange();
    let request = OrderRequest {
        order_type: OrderType::Limit,
        price: Some(dec!(64000.3)), // tick 0.5
        post_only: Some(true),
        ..base_request()
    };
    normalizer(&mock).place(request).await.unwrap();

    let placed = mock.placed_orders();
    assert_eq!(placed[0].price, dec!(64000.5));
    assert!(placed[0].post_only);
}

#[tokio::test]
async fn leverage_below_floor_is_rejected() {
    let mock = btc_exchange();
    let request = OrderRequest {
        leverage: Some(dec!(1)),
        ..base_request()
    };

    let err = normalizer(&mock).place(request).await.unwrap_err();
    assert!(err
        .to_string()
        .contains("Leverage must be between 2 and 20"));
    assert!(mock.leverage_updates().is_empty());
}

#[tokio::test]
async fn leverage_at_the_market_ceiling_is_accepted() {
    let mock = btc_exchange();
    let request = OrderRequest {
        leverage: Some(dec!(20)),
        ..base_request()
    };
    normalizer(&mock).place(request).await.unwrap();

    assert_eq!(mock.leverage_updates(), vec![("BTC-USD".to_string(), dec!(20))]);
}

#[tokio::test]
async fn leverage_defaults_to_fifteen() {
    let mock = btc_exchange();
    normalizer(&mock).place(base_request()).await.unwrap();

    assert_eq!(mock.leverage_updates(), vec![("BTC-USD".to_string(), dec!(15))]);
}

#[tokio::test]
async fn leverage_update_happens_before_placement() {
    let mock = btc_exchange();
    normalizer(&mock).place(base_request()).await.unwrap();

    let calls = mock.calls();
    let leverage_at = calls.iter().position(|c| c == "update_leverage").unwrap();
    let place_at = calls.iter().position(|c| c == "place_order").unwrap();
    assert!(leverage_at < place_at, "calls: {calls:?}");
}

#[tokio::test]
async fn take_profit_failure_is_captured_not_fatal() {
    let mock = Arc::new(
        MockExchange::new()
            .with_market(market("BTC-USD", btc_config()))
            .fail_take_profit("position not found"),
    );
    let request = OrderRequest {
        take_profit_price: Some(dec!(120)),
        stop_loss_price: Some(dec!(90)),
        ..base_request()
    };

    let result = normalizer(&mock).place(request).await.unwrap();
    assert_eq!(result.order_id, 1);

    let tp = result.take_profit.unwrap();
    assert!(!tp.success);
    assert!(tp.error.unwrap().contains("position not found"));

    let sl = result.stop_loss.unwrap();
    assert!(sl.success);
    assert!(sl.error.is_none());
}

#[tokio::test]
async fn attachment_prices_are_tick_rounded() {
    let mock = btc_exchange();
    let request = OrderRequest {
        take_profit_price: Some(dec!(105.3)), // tick 0.5
        ..base_request()
    };

    let result = normalizer(&mock).place(request).await.unwrap();
    assert_eq!(result.take_profit.unwrap().price, dec!(105.5));

    let triggers = mock.trigger_calls();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].2, dec!(105.5));
}

#[tokio::test]
async fn absent_attachments_stay_absent() {
    let mock = btc_exchange();
    let result = normalizer(&mock).place(base_request()).await.unwrap();
    assert!(result.take_profit.is_none());
    assert!(result.stop_loss.is_none());
}

#[tokio::test]
async fn placement_failure_propagates() {
    let mock = Arc::new(
        MockExchange::new()
            .with_market(market("BTC-USD", btc_config()))
            .fail_place_order("insufficient margin"),
    );

    let err = normalizer(&mock).place(base_request()).await.unwrap_err();
    assert!(matches!(err, Error::Exchange(_)));
    assert!(err.to_string().contains("insufficient margin"));
}

#[tokio::test]
async fn unknown_market_is_reported_as_not_found() {
    let mock = Arc::new(MockExchange::new()); // no markets configured
    let err = normalizer(&mock).place(base_request()).await.unwrap_err();
    assert!(matches!(err, Error::MarketNotFound { .. }));
}
