use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized coin reference embedded in holdings and alerts,
/// so lists render without a market-list lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfo {
    /// Provider-side coin id (e.g., "bitcoin")
    pub id: String,

    /// Ticker symbol as the provider reports it (e.g., "btc")
    pub symbol: String,

    /// Human-readable name (e.g., "Bitcoin")
    pub name: String,

    /// Logo URL for display
    pub image: String,
}

impl CoinInfo {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: image.into(),
        }
    }
}

/// One entry of the fetched market list (top coins by market cap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,

    /// Latest price in USD
    pub price: f64,

    /// 24h price change, in percent
    pub change_24h: f64,

    pub market_cap: f64,

    /// Market-cap rank; 0 when the provider reports none
    pub rank: u32,

    /// 7-day sparkline samples, when requested from the provider
    #[serde(default)]
    pub sparkline: Option<Vec<f64>>,
}

impl MarketCoin {
    /// The denormalized reference stored inside holdings and alerts.
    pub fn info(&self) -> CoinInfo {
        CoinInfo {
            id: self.id.clone(),
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// A single sample in a coin's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Chart range for history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    ThreeMonths,
    Year,
    All,
}

impl TimeRange {
    /// How many days of history to request; `None` means "everything".
    pub fn days(&self) -> Option<u32> {
        match self {
            TimeRange::Day => Some(1),
            TimeRange::Week => Some(7),
            TimeRange::Month => Some(30),
            TimeRange::ThreeMonths => Some(90),
            TimeRange::Year => Some(365),
            TimeRange::All => None,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Day => write!(f, "1D"),
            TimeRange::Week => write!(f, "7D"),
            TimeRange::Month => write!(f, "1M"),
            TimeRange::ThreeMonths => write!(f, "3M"),
            TimeRange::Year => write!(f, "1Y"),
            TimeRange::All => write!(f, "ALL"),
        }
    }
}
