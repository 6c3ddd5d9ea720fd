use std::collections::HashMap;

use crate::models::coin::MarketCoin;
use crate::models::price::PriceSnapshot;

/// How many coins the gainer/loser views return.
const TOP_MOVERS: usize = 5;

/// In-memory index of the fetched market list. Never persisted;
/// repopulated from the provider on demand.
#[derive(Default)]
pub struct MarketService {
    coins: Vec<MarketCoin>,
}

impl MarketService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index with a freshly fetched market-list page.
    pub fn set_coins(&mut self, coins: Vec<MarketCoin>) {
        self.coins = coins;
    }

    /// Merge refreshed prices into the list. Coins absent from the
    /// snapshot keep their previous price and 24h change.
    pub fn apply_price_update(&mut self, prices: &HashMap<String, PriceSnapshot>) {
        for coin in &mut self.coins {
            if let Some(snapshot) = prices.get(&coin.id) {
                coin.price = snapshot.price;
                if let Some(change) = snapshot.change_24h {
                    coin.change_24h = change;
                }
            }
        }
    }

    pub fn coins(&self) -> &[MarketCoin] {
        &self.coins
    }

    pub fn coin(&self, id: &str) -> Option<&MarketCoin> {
        self.coins.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Case-insensitive match on name or symbol. An empty query returns
    /// the whole list.
    pub fn search(&self, query: &str) -> Vec<&MarketCoin> {
        if query.is_empty() {
            return self.coins.iter().collect();
        }
        let q = query.to_lowercase();
        self.coins
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&q) || c.symbol.to_lowercase().contains(&q))
            .collect()
    }

    /// Top coins by 24h change, best first.
    pub fn top_gainers(&self) -> Vec<&MarketCoin> {
        let mut coins: Vec<&MarketCoin> = self.coins.iter().collect();
        coins.sort_by(|a, b| {
            b.change_24h
                .partial_cmp(&a.change_24h)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        coins.truncate(TOP_MOVERS);
        coins
    }

    /// Bottom coins by 24h change, worst first.
    pub fn top_losers(&self) -> Vec<&MarketCoin> {
        let mut coins: Vec<&MarketCoin> = self.coins.iter().collect();
        coins.sort_by(|a, b| {
            a.change_24h
                .partial_cmp(&b.change_24h)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        coins.truncate(TOP_MOVERS);
        coins
    }
}
