pub mod alert_service;
pub mod market_service;
pub mod portfolio_service;
pub mod refresh_coordinator;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::price::PriceCache;
use crate::notify::AlertNotifier;
use crate::storage::store::StateStore;

use self::alert_service::AlertService;
use self::market_service::MarketService;
use self::portfolio_service::PortfolioService;

/// Mutable core owned jointly by the facade and the refresh coordinator.
///
/// One lock guards the whole struct, so a refresh cycle's cache
/// replacement, ledger update, and alert evaluation can never interleave
/// with another cycle or with a user edit.
pub struct CoreState {
    pub cache: PriceCache,
    pub portfolio: PortfolioService,
    pub alerts: AlertService,
    pub market: MarketService,

    /// When the last successful refresh landed.
    pub last_update: Option<DateTime<Utc>>,
}

impl CoreState {
    /// Load persisted holdings and alerts from the store; malformed stored
    /// state starts empty instead of failing.
    pub fn load(store: Arc<dyn StateStore>, notifier: Arc<dyn AlertNotifier>) -> Self {
        Self {
            cache: PriceCache::new(),
            portfolio: PortfolioService::load(store.clone()),
            alerts: AlertService::load(store, notifier),
            market: MarketService::new(),
            last_update: None,
        }
    }
}
