use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coin::CoinInfo;

/// A user-recorded position in one coin.
///
/// `amount > 0` is a caller-supplied invariant; the ledger stores what it
/// is given and leaves input validation to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier
    pub id: Uuid,

    /// The coin this position is in
    pub coin: CoinInfo,

    /// Units held (always positive)
    pub amount: f64,

    /// Price paid per unit, in USD
    pub buy_price: f64,

    /// When the position was opened
    pub buy_date: DateTime<Utc>,

    /// Last refreshed market price; `None` until the first refresh lands
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl Holding {
    pub fn new(coin: CoinInfo, amount: f64, buy_price: f64, buy_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin,
            amount,
            buy_price,
            buy_date,
            current_price: None,
        }
    }

    /// Price used for valuation: the refreshed market price, falling back
    /// to the buy price until a refresh has landed.
    pub fn effective_price(&self) -> f64 {
        self.current_price.unwrap_or(self.buy_price)
    }

    /// Derived valuation, recomputed on every call so it can never go stale.
    pub fn valuation(&self) -> HoldingValuation {
        let current_value = self.amount * self.effective_price();
        let cost = self.amount * self.buy_price;
        let profit_loss = current_value - cost;
        let profit_loss_percentage = if cost > 0.0 {
            profit_loss / cost * 100.0
        } else {
            0.0
        };

        HoldingValuation {
            holding_id: self.id,
            coin: self.coin.clone(),
            amount: self.amount,
            current_value,
            cost,
            profit_loss,
            profit_loss_percentage,
        }
    }

    /// Merge a partial update into this record; only supplied fields change.
    pub fn apply(&mut self, update: HoldingUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(buy_price) = update.buy_price {
            self.buy_price = buy_price;
        }
        if let Some(buy_date) = update.buy_date {
            self.buy_date = buy_date;
        }
        if let Some(current_price) = update.current_price {
            self.current_price = Some(current_price);
        }
    }
}

/// Partial-field patch for `Holding`. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct HoldingUpdate {
    pub amount: Option<f64>,
    pub buy_price: Option<f64>,
    pub buy_date: Option<DateTime<Utc>>,
    pub current_price: Option<f64>,
}

/// Derived view of one holding against the latest known price.
/// Never persisted; rebuilt from `Holding` on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    pub holding_id: Uuid,
    pub coin: CoinInfo,
    pub amount: f64,

    /// amount × effective price
    pub current_value: f64,

    /// amount × buy price
    pub cost: f64,

    /// current_value − cost
    pub profit_loss: f64,

    /// profit_loss / cost × 100, or 0 when cost is 0
    pub profit_loss_percentage: f64,
}

/// Aggregate of all holding valuations, same zero-cost-guard rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    pub holdings: Vec<HoldingValuation>,
}
