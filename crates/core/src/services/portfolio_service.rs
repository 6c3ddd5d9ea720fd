use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::coin::CoinInfo;
use crate::models::holding::{Holding, HoldingUpdate, HoldingValuation, PortfolioSummary};
use crate::storage::store::StateStore;

/// Storage key for the serialized holdings list.
pub const HOLDINGS_KEY: &str = "portfolio-holdings";

/// Owns the holdings list and its persistence.
///
/// Valuations and the portfolio summary are derived on every read; no
/// derived field is cached, so a price update can never leave stale
/// figures behind. Every user-rate mutation persists synchronously;
/// market-rate price updates do not (see `apply_price_update`).
pub struct PortfolioService {
    holdings: Vec<Holding>,
    store: Arc<dyn StateStore>,
}

impl PortfolioService {
    /// Load persisted holdings from the store. Missing or malformed stored
    /// state starts an empty ledger instead of failing.
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let holdings = match store.get(HOLDINGS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(holdings) => holdings,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed stored holdings");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored holdings, starting empty");
                Vec::new()
            }
        };

        Self { holdings, store }
    }

    // ── Mutators ────────────────────────────────────────────────────

    /// Record a new holding and persist. The ledger accepts the fields as
    /// given; amount/price validation is the caller's concern.
    pub fn add_holding(
        &mut self,
        coin: CoinInfo,
        amount: f64,
        buy_price: f64,
        buy_date: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let holding = Holding::new(coin, amount, buy_price, buy_date);
        let id = holding.id;
        self.holdings.push(holding);
        self.persist()?;
        Ok(id)
    }

    /// Merge a partial update into a holding, then persist.
    /// Returns `false` (and writes nothing) when the id is unknown.
    pub fn update_holding(&mut self, id: Uuid, update: HoldingUpdate) -> Result<bool, CoreError> {
        let holding = match self.holdings.iter_mut().find(|h| h.id == id) {
            Some(holding) => holding,
            None => return Ok(false),
        };
        holding.apply(update);
        self.persist()?;
        Ok(true)
    }

    /// Remove a holding by id; `false` when absent.
    pub fn remove_holding(&mut self, id: Uuid) -> Result<bool, CoreError> {
        let before = self.holdings.len();
        self.holdings.retain(|h| h.id != id);
        if self.holdings.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Apply refreshed prices. Coins absent from the map keep their
    /// previous `current_price` (stale-price tolerance). Not persisted:
    /// refresh ticks are market-rate, and `current_price` is rebuilt by
    /// the next successful cycle anyway.
    pub fn apply_price_update(&mut self, prices: &HashMap<String, f64>) {
        for holding in &mut self.holdings {
            if let Some(price) = prices.get(&holding.coin.id) {
                holding.current_price = Some(*price);
            }
        }
    }

    /// Drop every holding and persist the empty ledger.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.holdings.clear();
        self.persist()
    }

    // ── Read accessors ──────────────────────────────────────────────

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn get(&self, id: Uuid) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Derived valuations, one per holding, rebuilt on every call.
    pub fn valuations(&self) -> Vec<HoldingValuation> {
        self.holdings.iter().map(Holding::valuation).collect()
    }

    /// Aggregate portfolio summary over the current valuations.
    pub fn summary(&self) -> PortfolioSummary {
        let valuations = self.valuations();
        let total_value: f64 = valuations.iter().map(|v| v.current_value).sum();
        let total_cost: f64 = valuations.iter().map(|v| v.cost).sum();
        let profit_loss = total_value - total_cost;
        let profit_loss_percentage = if total_cost > 0.0 {
            profit_loss / total_cost * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            total_value,
            total_cost,
            profit_loss,
            profit_loss_percentage,
            holdings: valuations,
        }
    }

    /// Unique coin ids across all holdings, in first-seen order.
    pub fn coin_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.holdings
            .iter()
            .filter(|h| seen.insert(h.coin.id.clone()))
            .map(|h| h.coin.id.clone())
            .collect()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn persist(&self) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&self.holdings)?;
        self.store.put(HOLDINGS_KEY, &raw)
    }
}
