pub mod errors;
pub mod models;
pub mod notify;
pub mod providers;
pub mod services;
pub mod storage;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use errors::CoreError;
use models::alert::{AlertDirection, PriceAlert};
use models::coin::{CoinInfo, MarketCoin, PricePoint, TimeRange};
use models::holding::{Holding, HoldingUpdate, HoldingValuation, PortfolioSummary};
use models::price::PriceSnapshot;
use notify::{AlertNotifier, LogNotifier};
use providers::coingecko::CoinGeckoProvider;
use providers::traits::MarketDataProvider;
use services::refresh_coordinator::RefreshCoordinator;
use services::CoreState;
use storage::store::{JsonFileStore, StateStore};

/// Main entry point for the Cryptofolio core library.
///
/// Holds the tracked state (price cache, holdings ledger, alerts, market
/// list) behind one lock, plus the refresh coordinator that keeps it
/// current. Collaborators (market data provider, local store, alert
/// notifier) are injected at construction; there are no ambient
/// singletons.
#[must_use]
pub struct CryptoFolio {
    state: Arc<RwLock<CoreState>>,
    provider: Arc<dyn MarketDataProvider>,
    refresher: RefreshCoordinator,
}

impl std::fmt::Debug for CryptoFolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoFolio")
            .field("provider", &self.provider.name())
            .field("running", &self.refresher.is_running())
            .field("updating", &self.refresher.is_updating())
            .finish()
    }
}

impl CryptoFolio {
    /// Wire the tracker from injected collaborators. Persisted holdings
    /// and alerts are loaded here; malformed stored state starts empty.
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        let state = Arc::new(RwLock::new(CoreState::load(store, notifier)));
        let refresher = RefreshCoordinator::new(state.clone(), provider.clone());
        Self {
            state,
            provider,
            refresher,
        }
    }

    /// Open a tracker backed by CoinGecko, a JSON file store under
    /// `data_dir`, and the logging notifier.
    pub fn open(data_dir: impl AsRef<Path>, api_key: Option<String>) -> Result<Self, CoreError> {
        let store = Arc::new(JsonFileStore::new(data_dir)?);
        let provider = Arc::new(CoinGeckoProvider::new(api_key));
        Ok(Self::new(provider, store, Arc::new(LogNotifier)))
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Record a new holding; returns its fresh id.
    pub async fn add_holding(
        &self,
        coin: CoinInfo,
        amount: f64,
        buy_price: f64,
        buy_date: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        self.state
            .write()
            .await
            .portfolio
            .add_holding(coin, amount, buy_price, buy_date)
    }

    /// Merge a partial update into a holding; `false` if the id is unknown.
    pub async fn update_holding(
        &self,
        id: Uuid,
        update: HoldingUpdate,
    ) -> Result<bool, CoreError> {
        self.state.write().await.portfolio.update_holding(id, update)
    }

    /// Remove a holding; `false` if the id is unknown.
    pub async fn remove_holding(&self, id: Uuid) -> Result<bool, CoreError> {
        self.state.write().await.portfolio.remove_holding(id)
    }

    /// Drop every holding.
    pub async fn clear_portfolio(&self) -> Result<(), CoreError> {
        self.state.write().await.portfolio.clear()
    }

    pub async fn holdings(&self) -> Vec<Holding> {
        self.state.read().await.portfolio.holdings().to_vec()
    }

    pub async fn holding_count(&self) -> usize {
        self.state.read().await.portfolio.holding_count()
    }

    /// Per-holding valuations against the latest known prices.
    pub async fn valuations(&self) -> Vec<HoldingValuation> {
        self.state.read().await.portfolio.valuations()
    }

    /// Aggregate portfolio summary.
    pub async fn summary(&self) -> PortfolioSummary {
        self.state.read().await.portfolio.summary()
    }

    // ── Alerts ──────────────────────────────────────────────────────

    /// Create a new active alert; returns its fresh id.
    pub async fn add_alert(
        &self,
        coin: CoinInfo,
        target_price: f64,
        direction: AlertDirection,
    ) -> Result<Uuid, CoreError> {
        self.state
            .write()
            .await
            .alerts
            .add_alert(coin, target_price, direction)
    }

    /// Remove an alert; `false` if the id is unknown.
    pub async fn remove_alert(&self, id: Uuid) -> Result<bool, CoreError> {
        self.state.write().await.alerts.remove_alert(id)
    }

    /// Flip an alert's active flag; `false` if the id is unknown.
    pub async fn toggle_alert(&self, id: Uuid) -> Result<bool, CoreError> {
        self.state.write().await.alerts.toggle_alert(id)
    }

    /// Re-arm a triggered alert; `false` if the id is unknown.
    pub async fn reset_triggered_alert(&self, id: Uuid) -> Result<bool, CoreError> {
        self.state.write().await.alerts.reset_triggered(id)
    }

    /// Drop every alert.
    pub async fn clear_alerts(&self) -> Result<(), CoreError> {
        self.state.write().await.alerts.clear()
    }

    pub async fn alerts(&self) -> Vec<PriceAlert> {
        self.state.read().await.alerts.alerts().to_vec()
    }

    /// Alerts that are armed: active and not yet triggered.
    pub async fn active_alerts(&self) -> Vec<PriceAlert> {
        self.state
            .read()
            .await
            .alerts
            .active_alerts()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn triggered_alerts(&self) -> Vec<PriceAlert> {
        self.state
            .read()
            .await
            .alerts
            .triggered_alerts()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn alerts_for_coin(&self, coin_id: &str) -> Vec<PriceAlert> {
        self.state
            .read()
            .await
            .alerts
            .alerts_for_coin(coin_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn alert_count(&self) -> usize {
        self.state.read().await.alerts.alert_count()
    }

    pub async fn active_alert_count(&self) -> usize {
        self.state.read().await.alerts.active_alert_count()
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Latest cached price for a coin, if any refresh has landed.
    pub async fn get_price(&self, coin_id: &str) -> Option<f64> {
        self.state.read().await.cache.get_price(coin_id)
    }

    pub async fn price_snapshot(&self, coin_id: &str) -> Option<PriceSnapshot> {
        self.state.read().await.cache.get(coin_id).copied()
    }

    /// When the last successful refresh landed.
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_update
    }

    // ── Market list ─────────────────────────────────────────────────

    /// Fetch one market-list page from the provider and replace the
    /// in-memory index. Returns how many coins were loaded.
    pub async fn refresh_markets(&self, page: u32, per_page: u32) -> Result<usize, CoreError> {
        let coins = self.provider.fetch_market_list(page, per_page).await?;
        let count = coins.len();
        self.state.write().await.market.set_coins(coins);
        Ok(count)
    }

    pub async fn market_coins(&self) -> Vec<MarketCoin> {
        self.state.read().await.market.coins().to_vec()
    }

    pub async fn market_coin(&self, id: &str) -> Option<MarketCoin> {
        self.state.read().await.market.coin(id).cloned()
    }

    /// Case-insensitive market search on name or symbol.
    pub async fn search_coins(&self, query: &str) -> Vec<MarketCoin> {
        self.state
            .read()
            .await
            .market
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn top_gainers(&self) -> Vec<MarketCoin> {
        self.state
            .read()
            .await
            .market
            .top_gainers()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn top_losers(&self) -> Vec<MarketCoin> {
        self.state
            .read()
            .await
            .market
            .top_losers()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Price history for one coin over a chart range, straight from the
    /// provider.
    pub async fn coin_history(
        &self,
        coin_id: &str,
        range: TimeRange,
    ) -> Result<Vec<PricePoint>, CoreError> {
        self.provider.fetch_history(coin_id, range).await
    }

    // ── Refresh lifecycle ───────────────────────────────────────────

    /// Start periodic price refreshes. Idempotent while running.
    pub fn start_updates(&self, interval: Duration) {
        self.refresher.start(interval);
    }

    /// Cancel future refresh ticks. Safe to call when not running.
    pub fn stop_updates(&self) {
        self.refresher.stop();
    }

    /// Run one refresh cycle immediately, behind the usual overlap guard.
    pub async fn refresh_now(&self) {
        self.refresher.refresh_now().await;
    }

    /// Whether a refresh cycle is currently in flight.
    pub fn is_updating(&self) -> bool {
        self.refresher.is_updating()
    }

    /// Whether the periodic timer is running.
    pub fn is_running(&self) -> bool {
        self.refresher.is_running()
    }
}
