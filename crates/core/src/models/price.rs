use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Latest known market data for one coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Price in USD
    pub price: f64,

    /// 24h change in percent, when the provider reports one
    pub change_24h: Option<f64>,
}

/// Latest known price per tracked coin id.
///
/// Replaced wholesale on every successful refresh, never merged entry by
/// entry. Consumers that miss a coin in the new snapshot keep their
/// previous value instead (stale-price tolerance). No eviction: the map is
/// bounded by the set of tracked coins.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    entries: HashMap<String, PriceSnapshot>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest price for a coin, if one has been fetched.
    pub fn get_price(&self, coin_id: &str) -> Option<f64> {
        self.entries.get(coin_id).map(|s| s.price)
    }

    pub fn get(&self, coin_id: &str) -> Option<&PriceSnapshot> {
        self.entries.get(coin_id)
    }

    /// Overwrite the whole cache with a fresh fetch result.
    pub fn replace_all(&mut self, entries: HashMap<String, PriceSnapshot>) {
        self.entries = entries;
    }

    /// Flat coin id → price map for feeding the ledger and alert engine.
    pub fn price_map(&self) -> HashMap<String, f64> {
        self.entries
            .iter()
            .map(|(id, snapshot)| (id.clone(), snapshot.price))
            .collect()
    }

    pub fn snapshots(&self) -> &HashMap<String, PriceSnapshot> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
