use serde::{Deserialize, Serialize};

/// Trailing boundaries carried between evaluation cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailingState {
    #[serde(default)]
    pub trailing_stop_price: Option<f64>,
    #[serde(default)]
    pub trailing_profit_price: Option<f64>,
    #[serde(default)]
    pub highest_price_since_ttp: Option<f64>,
}

impl TrailingState {
    pub fn is_trailing_profit_active(&self) -> bool {
        self.trailing_profit_price.is_some()
    }
}

/// An open holding as persisted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPosition {
    pub symbol: String,
    pub buy_price: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    #[serde(default)]
    pub trailing_stop_price: Option<f64>,
    #[serde(default)]
    pub trailing_profit_price: Option<f64>,
    #[serde(default)]
    pub highest_price_since_ttp: Option<f64>,
}

impl StockPosition {
    pub fn new(symbol: &str, buy_price: f64, stop_loss_price: f64, take_profit_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            buy_price,
            stop_loss_price,
            take_profit_price,
            trailing_stop_price: None,
            trailing_profit_price: None,
            highest_price_since_ttp: None,
        }
    }

    pub fn trailing_state(&self) -> TrailingState {
        TrailingState {
            trailing_stop_price: self.trailing_stop_price,
            trailing_profit_price: self.trailing_profit_price,
            highest_price_since_ttp: self.highest_price_since_ttp,
        }
    }

    /// Copy an evaluation's trailing state back onto the position before persisting it.
    pub fn apply_trailing(&mut self, state: &TrailingState) {
        self.trailing_stop_price = state.trailing_stop_price;
        self.trailing_profit_price = state.trailing_profit_price;
        self.highest_price_since_ttp = state.highest_price_since_ttp;
    }

    /// The greater of the planned stop and the trailing stop.
    pub fn effective_stop_loss(&self) -> f64 {
        effective_stop(self.stop_loss_price, &self.trailing_state())
    }
}

pub fn effective_stop(stop_loss: f64, state: &TrailingState) -> f64 {
    state
        .trailing_stop_price
        .map_or(stop_loss, |ts| ts.max(stop_loss))
}
