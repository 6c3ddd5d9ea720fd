use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::alert::{AlertDirection, PriceAlert};
use crate::models::coin::CoinInfo;
use crate::notify::AlertNotifier;
use crate::storage::store::StateStore;

/// Storage key for the serialized alert list.
pub const ALERTS_KEY: &str = "price-alerts";

/// Owns the alert list, its persistence, and the evaluation state machine.
pub struct AlertService {
    alerts: Vec<PriceAlert>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn AlertNotifier>,
}

impl AlertService {
    /// Load persisted alerts from the store. Missing or malformed stored
    /// state starts an empty alert set instead of failing.
    pub fn load(store: Arc<dyn StateStore>, notifier: Arc<dyn AlertNotifier>) -> Self {
        let alerts = match store.get(ALERTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(alerts) => alerts,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed stored alerts");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored alerts, starting empty");
                Vec::new()
            }
        };

        Self {
            alerts,
            store,
            notifier,
        }
    }

    // ── Mutators ────────────────────────────────────────────────────

    /// Create a new active, untriggered alert and persist.
    pub fn add_alert(
        &mut self,
        coin: CoinInfo,
        target_price: f64,
        direction: AlertDirection,
    ) -> Result<Uuid, CoreError> {
        let alert = PriceAlert::new(coin, target_price, direction);
        let id = alert.id;
        self.alerts.push(alert);
        self.persist()?;
        Ok(id)
    }

    /// Remove an alert by id; `false` when absent.
    pub fn remove_alert(&mut self, id: Uuid) -> Result<bool, CoreError> {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        if self.alerts.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flip the suspend flag. Does not touch the triggered latch: a
    /// triggered alert that gets deactivated stays triggered.
    pub fn toggle_alert(&mut self, id: Uuid) -> Result<bool, CoreError> {
        let alert = match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => alert,
            None => return Ok(false),
        };
        alert.is_active = !alert.is_active;
        self.persist()?;
        Ok(true)
    }

    /// Re-arm a triggered alert: clears the latch and its timestamp.
    pub fn reset_triggered(&mut self, id: Uuid) -> Result<bool, CoreError> {
        let alert = match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => alert,
            None => return Ok(false),
        };
        alert.is_triggered = false;
        alert.triggered_at = None;
        self.persist()?;
        Ok(true)
    }

    /// Drop every alert and persist the empty set.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.alerts.clear();
        self.persist()
    }

    /// One evaluation pass against the given prices; returns the batch of
    /// newly-triggered alerts.
    ///
    /// Only armed alerts (`is_active && !is_triggered`) are considered. A
    /// coin missing from the map cannot be evaluated yet and is skipped
    /// (stale-price tolerance, not a failure). When the batch is
    /// non-empty it is persisted once and handed to the notifier,
    /// fire-and-forget.
    pub fn evaluate(
        &mut self,
        prices: &HashMap<String, f64>,
    ) -> Result<Vec<PriceAlert>, CoreError> {
        let now = Utc::now();
        let mut triggered = Vec::new();

        for alert in &mut self.alerts {
            if !alert.is_active || alert.is_triggered {
                continue;
            }
            let price = match prices.get(&alert.coin.id) {
                Some(price) => *price,
                None => continue,
            };
            if alert.crossed(price) {
                alert.is_triggered = true;
                alert.triggered_at = Some(now);
                triggered.push(alert.clone());
            }
        }

        if !triggered.is_empty() {
            self.persist()?;
            self.notifier.notify(&triggered);
        }

        Ok(triggered)
    }

    // ── Read accessors ──────────────────────────────────────────────

    pub fn alerts(&self) -> &[PriceAlert] {
        &self.alerts
    }

    pub fn get(&self, id: Uuid) -> Option<&PriceAlert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Alerts that are armed: active and not yet triggered.
    pub fn active_alerts(&self) -> Vec<&PriceAlert> {
        self.alerts
            .iter()
            .filter(|a| a.is_active && !a.is_triggered)
            .collect()
    }

    pub fn triggered_alerts(&self) -> Vec<&PriceAlert> {
        self.alerts.iter().filter(|a| a.is_triggered).collect()
    }

    pub fn alerts_for_coin(&self, coin_id: &str) -> Vec<&PriceAlert> {
        self.alerts.iter().filter(|a| a.coin.id == coin_id).collect()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn active_alert_count(&self) -> usize {
        self.active_alerts().len()
    }

    /// Unique coin ids across all alerts, in first-seen order.
    pub fn coin_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.alerts
            .iter()
            .filter(|a| seen.insert(a.coin.id.clone()))
            .map(|a| a.coin.id.clone())
            .collect()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn persist(&self) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&self.alerts)?;
        self.store.put(ALERTS_KEY, &raw)
    }
}
