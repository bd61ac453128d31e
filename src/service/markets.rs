//! Market overview assembly.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{MarketOverview, StatisticsField};
use crate::error::Result;
use crate::exchange::ExchangeClient;

/// Merge each market's configuration with its live statistics.
///
/// A statistics failure for one market is captured in-line so the rest of
/// the batch still returns; a failure listing the markets themselves is a
/// real error.
pub async fn market_overviews(
    exchange: &Arc<dyn ExchangeClient>,
    market_names: &[String],
) -> Result<Vec<MarketOverview>> {
    let markets = exchange.get_markets(market_names).await?;

    let mut overviews = Vec::with_capacity(markets.len());
    for market in markets {
        let statistics = match exchange.get_market_statistics(&market.name).await {
            Ok(stats) => StatisticsField::Available(stats),
            Err(e) => {
                warn!(market = %market.name, error = %e, "statistics fetch failed");
                StatisticsField::Unavailable {
                    error: format!("Failed to get statistics: {e}"),
                }
            }
        };
        overviews.push(MarketOverview {
            name: market.name.clone(),
            config: market,
            statistics,
        });
    }
    Ok(overviews)
}
