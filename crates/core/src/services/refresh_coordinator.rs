use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::providers::traits::MarketDataProvider;
use crate::services::CoreState;

/// Periodic refresh driver.
///
/// A tokio timer task fires one cycle per interval; every cycle runs as
/// its own task behind an atomic updating flag, so a tick that lands
/// while the previous cycle is still fetching is a no-op instead of a
/// second network call. Within a cycle, cache replacement strictly
/// precedes the ledger price update, which strictly precedes alert
/// evaluation, all under one write-lock acquisition.
pub struct RefreshCoordinator {
    state: Arc<RwLock<CoreState>>,
    provider: Arc<dyn MarketDataProvider>,
    is_updating: Arc<AtomicBool>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Clears the updating flag when the cycle ends, on every exit path.
struct UpdateGuard(Arc<AtomicBool>);

impl Drop for UpdateGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RefreshCoordinator {
    pub fn new(state: Arc<RwLock<CoreState>>, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            state,
            provider,
            is_updating: Arc::new(AtomicBool::new(false)),
            timer: Mutex::new(None),
        }
    }

    /// Start periodic refreshes. The first cycle fires immediately, then
    /// once per `interval`. Calling `start` while already running is a
    /// no-op.
    pub fn start(&self, interval: Duration) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if timer.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let state = self.state.clone();
        let provider = self.provider.clone();
        let is_updating = self.is_updating.clone();

        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let state = state.clone();
                let provider = provider.clone();
                let is_updating = is_updating.clone();
                // Each cycle runs detached so stop() cancels only the
                // timer, never a cycle that is already applying results.
                tokio::spawn(async move {
                    Self::run_cycle(&state, &provider, &is_updating).await;
                });
            }
        }));
    }

    /// Cancel future ticks. Safe to call when not running; an in-flight
    /// cycle still completes and applies its results.
    pub fn stop(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = timer.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Whether a refresh cycle is currently in flight.
    pub fn is_updating(&self) -> bool {
        self.is_updating.load(Ordering::SeqCst)
    }

    /// Run one cycle outside the timer, behind the same guard.
    pub async fn refresh_now(&self) {
        Self::run_cycle(&self.state, &self.provider, &self.is_updating).await;
    }

    async fn run_cycle(
        state: &Arc<RwLock<CoreState>>,
        provider: &Arc<dyn MarketDataProvider>,
        is_updating: &Arc<AtomicBool>,
    ) {
        if is_updating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("refresh already in progress, skipping tick");
            return;
        }
        let _guard = UpdateGuard(is_updating.clone());

        let coin_ids = {
            let s = state.read().await;
            let mut ids = s.portfolio.coin_ids();
            for id in s.alerts.coin_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        };
        if coin_ids.is_empty() {
            tracing::debug!("nothing tracked, skipping refresh");
            return;
        }

        let snapshots = match provider.fetch_prices(&coin_ids).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                // Transient upstream failure: skip the cycle, leave every
                // piece of state exactly as it was.
                tracing::warn!(
                    error = %e,
                    provider = provider.name(),
                    "price refresh failed, keeping previous prices"
                );
                return;
            }
        };

        let mut guard = state.write().await;
        let s = &mut *guard;
        s.cache.replace_all(snapshots);
        s.last_update = Some(chrono::Utc::now());
        s.market.apply_price_update(s.cache.snapshots());
        if s.portfolio.holding_count() > 0 {
            let prices = s.cache.price_map();
            s.portfolio.apply_price_update(&prices);
            if let Err(e) = s.alerts.evaluate(&prices) {
                tracing::warn!(error = %e, "failed to persist triggered alerts");
            }
        }
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
