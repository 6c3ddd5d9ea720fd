use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::coin::{MarketCoin, PricePoint, TimeRange};
use crate::models::price::PriceSnapshot;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API provider for cryptocurrency market data.
///
/// - **Free tier**: works without a key; a demo API key raises the rate
///   limit and is sent as the `x-cg-demo-api-key` header when configured.
/// - **Endpoints**: `/coins/markets`, `/simple/price`,
///   `/coins/{id}/market_chart`.
///
/// CoinGecko identifies coins by lowercase ids like "bitcoin"; those ids
/// are what the rest of the crate tracks.
pub struct CoinGeckoProvider {
    client: Client,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("x-cg-demo-api-key", key);
        }
        req
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct MarketEntry {
    id: String,
    symbol: String,
    name: String,
    image: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
    sparkline_in_7d: Option<SparklineData>,
}

#[derive(Deserialize)]
struct SparklineData {
    price: Vec<f64>,
}

#[derive(Deserialize)]
struct SimplePriceEntry {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

#[derive(Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

fn to_market_coins(entries: Vec<MarketEntry>) -> Vec<MarketCoin> {
    entries
        .into_iter()
        .map(|entry| MarketCoin {
            id: entry.id,
            symbol: entry.symbol,
            name: entry.name,
            image: entry.image,
            price: entry.current_price.unwrap_or(0.0),
            change_24h: entry.price_change_percentage_24h.unwrap_or(0.0),
            market_cap: entry.market_cap.unwrap_or(0.0),
            rank: entry.market_cap_rank.unwrap_or(0),
            sparkline: entry.sparkline_in_7d.map(|s| s.price),
        })
        .collect()
}

fn to_snapshots(entries: HashMap<String, SimplePriceEntry>) -> HashMap<String, PriceSnapshot> {
    entries
        .into_iter()
        .filter_map(|(id, entry)| {
            // Ids the API cannot price come back without a "usd" field;
            // they are dropped rather than reported as zero.
            let price = entry.usd?;
            Some((
                id,
                PriceSnapshot {
                    price,
                    change_24h: entry.usd_24h_change,
                },
            ))
        })
        .collect()
}

fn to_price_points(chart: MarketChartResponse) -> Vec<PricePoint> {
    chart
        .prices
        .into_iter()
        .filter_map(|(ts_millis, price)| {
            let timestamp = chrono::DateTime::from_timestamp_millis(ts_millis as i64)?;
            Some(PricePoint { timestamp, price })
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch_market_list(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MarketCoin>, CoreError> {
        let url = format!(
            "{BASE_URL}/coins/markets?vs_currency=usd&order=market_cap_desc\
             &per_page={per_page}&page={page}&sparkline=true&price_change_percentage=24h&locale=en"
        );

        let entries: Vec<MarketEntry> = self
            .request(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Failed to parse market list: {e}"),
            })?;

        Ok(to_market_coins(entries))
    }

    async fn fetch_prices(
        &self,
        coin_ids: &[String],
    ) -> Result<HashMap<String, PriceSnapshot>, CoreError> {
        if coin_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = coin_ids.join(",");
        let url = format!(
            "{BASE_URL}/simple/price?ids={ids}&vs_currencies=usd&include_24hr_change=true"
        );

        let entries: HashMap<String, SimplePriceEntry> = self
            .request(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Failed to parse prices: {e}"),
            })?;

        Ok(to_snapshots(entries))
    }

    async fn fetch_history(
        &self,
        coin_id: &str,
        range: TimeRange,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let days = range
            .days()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "max".to_string());
        let url = format!("{BASE_URL}/coins/{coin_id}/market_chart?vs_currency=usd&days={days}");

        let chart: MarketChartResponse = self
            .request(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Failed to parse history for {coin_id}: {e}"),
            })?;

        Ok(to_price_points(chart))
    }
}
