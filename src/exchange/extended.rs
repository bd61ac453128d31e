//! reqwest adapter for the exchange REST API.
//!
//! Response bodies arrive in a `{ status, data, error }` envelope; `data` is
//! decoded into the domain types and an `error` payload becomes
//! [`Error::Exchange`]. No retries: every transport failure surfaces to the
//! caller immediately.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::{Credentials, ExchangeConfig, TradingConfig};
use crate::domain::{
    Balance, Market, MarketLeverage, MarketStats, NormalizedOrder, OpenOrders, PlacedOrder,
    Position, Side, TimeInForce,
};
use crate::error::{Error, Result};

use super::traits::ExchangeClient;

const API_KEY_HEADER: &str = "X-Api-Key";
/// Fixed path used by the raw open-orders fallback.
const OPEN_ORDERS_PATH: &str = "/user/orders";

pub struct ExtendedClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    gtt_expiry_days: i64,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    message: String,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(Error::Exchange(err.message));
        }
        self.data
            .ok_or_else(|| Error::Exchange("response envelope carried no data".into()))
    }
}

/// Wire shape for order placement.
#[derive(Debug, Serialize)]
struct OrderPayload<'a> {
    market: &'a str,
    side: Side,
    qty: Decimal,
    price: Decimal,
    time_in_force: TimeInForce,
    post_only: bool,
    external_id: String,
    vault: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_epoch_millis: Option<i64>,
}

#[derive(Debug, Serialize)]
struct LeveragePayload<'a> {
    market: &'a str,
    leverage: Decimal,
}

#[derive(Debug, Serialize)]
struct TriggerPayload<'a> {
    market: &'a str,
    price: Decimal,
}

impl ExtendedClient {
    pub fn new(
        exchange: &ExchangeConfig,
        trading: &TradingConfig,
        credentials: Credentials,
    ) -> Result<Self> {
        // Parse up front so a bad URL fails at startup, not mid-request.
        let parsed = Url::parse(&exchange.api_url)?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&credentials.api_key)
            .map_err(|e| Error::Exchange(format!("API key is not a valid header value: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
            gtt_expiry_days: trading.gtt_expiry_days,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope<T> = response.json().await?;
        envelope.into_result()
    }

    fn market_query<'a>(market_names: &'a [String]) -> Vec<(&'static str, &'a str)> {
        market_names
            .iter()
            .map(|name| ("market", name.as_str()))
            .collect()
    }
}

#[async_trait]
impl ExchangeClient for ExtendedClient {
    async fn get_market_statistics(&self, market: &str) -> Result<MarketStats> {
        self.get(&format!("/info/markets/{market}/stats"), &[]).await
    }

    async fn get_markets(&self, market_names: &[String]) -> Result<Vec<Market>> {
        self.get("/info/markets", &Self::market_query(market_names))
            .await
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.get("/user/balance", &[]).await
    }

    async fn get_leverage(&self, market_names: &[String]) -> Result<Vec<MarketLeverage>> {
        self.get("/user/leverage", &Self::market_query(market_names))
            .await
    }

    async fn get_positions(&self, market_names: &[String]) -> Result<Vec<Position>> {
        self.get("/user/positions", &Self::market_query(market_names))
            .await
    }

    async fn get_positions_history(&self, market_names: &[String]) -> Result<Vec<Position>> {
        self.get("/user/positions/history", &Self::market_query(market_names))
            .await
    }

    async fn get_open_orders(&self) -> Result<OpenOrders> {
        let response = self
            .http
            .get(self.url(OPEN_ORDERS_PATH))
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        match serde_json::from_slice::<Envelope<Vec<crate::domain::OpenOrder>>>(&body) {
            Ok(envelope) => Ok(OpenOrders::Parsed(envelope.into_result()?)),
            Err(parse_error) => {
                // Shape drifted; degrade to the unparsed body rather than
                // failing the request.
                warn!(error = %parse_error, "open orders response shape mismatch, returning raw body");
                let raw = self
                    .http
                    .get(self.url(OPEN_ORDERS_PATH))
                    .send()
                    .await?
                    .json::<serde_json::Value>()
                    .await?;
                Ok(OpenOrders::Raw(raw))
            }
        }
    }

    async fn update_leverage(&self, market: &str, leverage: Decimal) -> Result<()> {
        let response = self
            .http
            .patch(self.url("/user/leverage"))
            .json(&LeveragePayload { market, leverage })
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        if let Some(err) = envelope.error {
            return Err(Error::Exchange(err.message));
        }
        Ok(())
    }

    async fn place_order(&self, order: &NormalizedOrder) -> Result<PlacedOrder> {
        let expiry_epoch_millis = order
            .expire_time
            .map(|t| t.timestamp_millis())
            .or_else(|| match order.time_in_force {
                TimeInForce::Gtt => Some(
                    (Utc::now() + Duration::days(self.gtt_expiry_days)).timestamp_millis(),
                ),
                TimeInForce::Ioc => None,
            });

        let payload = OrderPayload {
            market: &order.market,
            side: order.side,
            qty: order.amount,
            price: order.price,
            time_in_force: order.time_in_force,
            post_only: order.post_only,
            external_id: Uuid::new_v4().to_string(),
            vault: self.credentials.vault_id,
            expiry_epoch_millis,
        };
        debug!(
            market = %order.market,
            qty = %order.amount,
            price = %order.price,
            tif = ?order.time_in_force,
            "submitting order"
        );

        let response = self
            .http
            .post(self.url("/user/order"))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope<PlacedOrder> = response.json().await?;
        envelope.into_result()
    }

    async fn set_take_profit(&self, market: &str, price: Decimal) -> Result<serde_json::Value> {
        let response = self
            .http
            .post(self.url("/user/order/take_profit"))
            .json(&TriggerPayload { market, price })
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        envelope.into_result()
    }

    async fn set_stop_loss(&self, market: &str, price: Decimal) -> Result<serde_json::Value> {
        let response = self
            .http
            .post(self.url("/user/order/stop_loss"))
            .json(&TriggerPayload { market, price })
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        envelope.into_result()
    }
}
