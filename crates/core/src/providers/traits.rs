use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::coin::{MarketCoin, PricePoint, TimeRange};
use crate::models::price::PriceSnapshot;

/// Trait abstraction for market data sources.
///
/// The shipped implementation talks to CoinGecko; tests substitute mocks.
/// If the upstream API changes or gets replaced, only the one
/// implementation moves; the rest of the codebase is untouched.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// One page of the market list, ordered by market cap.
    async fn fetch_market_list(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MarketCoin>, CoreError>;

    /// Latest price (and 24h change, when available) per coin id.
    /// Ids the provider does not know are simply absent from the result.
    async fn fetch_prices(
        &self,
        coin_ids: &[String],
    ) -> Result<HashMap<String, PriceSnapshot>, CoreError>;

    /// Price history for one coin over a chart range, oldest first.
    async fn fetch_history(
        &self,
        coin_id: &str,
        range: TimeRange,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
