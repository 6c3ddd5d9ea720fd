use crate::models::alert::PriceAlert;

/// Sink for newly-triggered alert batches.
///
/// The alert engine hands batches over fire-and-forget: no retry, no
/// delivery confirmation. Actual OS-level notification delivery is the
/// embedder's job; this crate ships logging and no-op implementations.
pub trait AlertNotifier: Send + Sync {
    fn notify(&self, alerts: &[PriceAlert]);
}

/// Logs each triggered alert through `tracing`.
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn notify(&self, alerts: &[PriceAlert]) {
        for alert in alerts {
            tracing::info!(
                coin = %alert.coin.symbol,
                name = %alert.coin.name,
                direction = %alert.direction,
                target_price = alert.target_price,
                "price alert triggered"
            );
        }
    }
}

/// Discards every batch.
pub struct NullNotifier;

impl AlertNotifier for NullNotifier {
    fn notify(&self, _alerts: &[PriceAlert]) {}
}
