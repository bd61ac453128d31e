//! Configuration loading.
//!
//! Tunables live in a TOML file (`config.toml` by default); account
//! credentials are only ever read from the environment, never from the file.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Base URL of the exchange REST API.
    pub api_url: String,
}

/// Risk parameters for order normalization.
///
/// The market-order price multipliers are deliberately configuration, not
/// constants: they bound worst-case slippage on IOC fills and different
/// deployments run different values.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Mark-price multiplier for market buys. Must be > 1.
    #[serde(default = "default_buy_multiplier")]
    pub buy_price_multiplier: Decimal,
    /// Mark-price multiplier for market sells. Must be in (0, 1).
    #[serde(default = "default_sell_multiplier")]
    pub sell_price_multiplier: Decimal,
    /// Leverage applied when the request does not specify one.
    #[serde(default = "default_leverage")]
    pub default_leverage: Decimal,
    /// Expiry window for good-till-time limit orders.
    #[serde(default = "default_gtt_expiry_days")]
    pub gtt_expiry_days: i64,
}

fn default_buy_multiplier() -> Decimal {
    dec!(1.05)
}

fn default_sell_multiplier() -> Decimal {
    dec!(0.95)
}

fn default_leverage() -> Decimal {
    dec!(15)
}

fn default_gtt_expiry_days() -> i64 {
    28
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.exchange.api_url.is_empty() {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "exchange.api_url",
                reason: "cannot be empty".into(),
            }));
        }
        if self.trading.buy_price_multiplier <= Decimal::ONE {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "trading.buy_price_multiplier",
                reason: format!(
                    "must be > 1 to guarantee IOC fills on buys, got {}",
                    self.trading.buy_price_multiplier
                ),
            }));
        }
        if self.trading.sell_price_multiplier >= Decimal::ONE
            || self.trading.sell_price_multiplier <= Decimal::ZERO
        {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "trading.sell_price_multiplier",
                reason: format!(
                    "must be in (0, 1) to guarantee IOC fills on sells, got {}",
                    self.trading.sell_price_multiplier
                ),
            }));
        }
        if self.trading.gtt_expiry_days <= 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "trading.gtt_expiry_days",
                reason: "must be positive".into(),
            }));
        }
        Ok(())
    }

    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            buy_price_multiplier: default_buy_multiplier(),
            sell_price_multiplier: default_sell_multiplier(),
            default_leverage: default_leverage(),
            gtt_expiry_days: default_gtt_expiry_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Trading-account identity, sourced from the environment at startup.
///
/// The private key never appears in the config file and is not logged.
#[derive(Clone)]
pub struct Credentials {
    pub vault_id: u64,
    pub private_key: String,
    pub public_key: String,
    pub api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let vault_raw = require_env("VAULT_ID")?;
        let vault_id = vault_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "VAULT_ID",
                reason: format!("expected an integer, got {vault_raw:?}"),
            })?;
        Ok(Self {
            vault_id,
            private_key: require_env("PRIVATE_KEY")?,
            public_key: require_env("PUBLIC_KEY")?,
            api_key: require_env("API_KEY")?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("vault_id", &self.vault_id)
            .field("public_key", &self.public_key)
            .field("api_key", &"<redacted>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

fn require_env(var: &'static str) -> Result<String> {
    std::env::var(var).map_err(|_| ConfigError::MissingEnv { var }.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(trading: &str) -> String {
        format!(
            r#"
[exchange]
api_url = "https://api.example.com/v1"

[trading]
{trading}
"#
        )
    }

    #[test]
    fn defaults_applied_when_sections_omitted() {
        let config: Config =
            toml::from_str("[exchange]\napi_url = \"https://api.example.com\"").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.trading.buy_price_multiplier, dec!(1.05));
        assert_eq!(config.trading.sell_price_multiplier, dec!(0.95));
        assert_eq!(config.trading.default_leverage, dec!(15));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn buy_multiplier_must_exceed_one() {
        let config: Config =
            toml::from_str(&base_config("buy_price_multiplier = 0.99")).unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "trading.buy_price_multiplier",
                ..
            }))
        ));
    }

    #[test]
    fn sell_multiplier_must_be_below_one() {
        let config: Config =
            toml::from_str(&base_config("sell_price_multiplier = 1.01")).unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "trading.sell_price_multiplier",
                ..
            }))
        ));
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let creds = Credentials {
            vault_id: 42,
            private_key: "sk".into(),
            public_key: "pk".into(),
            api_key: "ak".into(),
        };
        let printed = format!("{creds:?}");
        assert!(!printed.contains("sk"));
        assert!(!printed.contains("ak"));
    }
}
