use std::sync::Arc;

use perpgate::api::{self, AppState};
use perpgate::config::{Config, Credentials};
use perpgate::exchange::{ExchangeClient, ExtendedClient};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::load("config.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.init_logging();

    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load account credentials");
            std::process::exit(1);
        }
    };

    let client = match ExtendedClient::new(&config.exchange, &config.trading, credentials) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to construct exchange client");
            std::process::exit(1);
        }
    };
    let exchange: Arc<dyn ExchangeClient> = Arc::new(client);
    let state = AppState::new(exchange, config.trading.clone());
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(addr = %addr, "perpgate starting");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, addr = %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal server error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("perpgate stopped");
}
