use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coin::CoinInfo;

/// Which side of the target price fires the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    /// Fire when the price reaches or exceeds the target
    Above,
    /// Fire when the price reaches or falls below the target
    Below,
}

impl std::fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

/// A user-configured price alert.
///
/// State machine: armed (`is_active && !is_triggered`) → triggered on a
/// crossing → back to armed only on explicit reset. `is_active` is an
/// orthogonal suspend flag; deactivating a triggered alert leaves
/// `is_triggered` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    /// Unique identifier
    pub id: Uuid,

    /// The watched coin
    pub coin: CoinInfo,

    /// Threshold price in USD (positive)
    pub target_price: f64,

    pub direction: AlertDirection,

    /// Suspend flag; inactive alerts are never evaluated
    pub is_active: bool,

    /// Latched on the first crossing, cleared only by explicit reset
    pub is_triggered: bool,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub triggered_at: Option<DateTime<Utc>>,
}

impl PriceAlert {
    pub fn new(coin: CoinInfo, target_price: f64, direction: AlertDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin,
            target_price,
            direction,
            is_active: true,
            is_triggered: false,
            created_at: Utc::now(),
            triggered_at: None,
        }
    }

    /// Crossing test. Inclusive on both sides: a price exactly at the
    /// target fires.
    pub fn crossed(&self, price: f64) -> bool {
        match self.direction {
            AlertDirection::Above => price >= self.target_price,
            AlertDirection::Below => price <= self.target_price,
        }
    }
}
