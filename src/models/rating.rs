use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical technical rating as published by the indicator provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongSell,
    Sell,
    Neutral,
    Buy,
    StrongBuy,
}

impl Default for Recommendation {
    fn default() -> Self {
        Recommendation::Neutral
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongSell => "STRONG_SELL",
            Recommendation::Sell => "SELL",
            Recommendation::Neutral => "NEUTRAL",
            Recommendation::Buy => "BUY",
            Recommendation::StrongBuy => "STRONG_BUY",
        }
    }

    /// Score code in -2..=2 used by the weighted aggregation.
    pub fn code(self) -> i32 {
        match self {
            Recommendation::StrongSell => -2,
            Recommendation::Sell => -1,
            Recommendation::Neutral => 0,
            Recommendation::Buy => 1,
            Recommendation::StrongBuy => 2,
        }
    }

    /// Map the provider's numeric rating in [-1, 1] onto a category.
    pub fn from_rating(rating: f64) -> Self {
        if rating > 0.5 {
            Recommendation::StrongBuy
        } else if rating > 0.1 {
            Recommendation::Buy
        } else if rating >= -0.1 {
            Recommendation::Neutral
        } else if rating >= -0.5 {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "STRONG_SELL" => Some(Recommendation::StrongSell),
            "SELL" => Some(Recommendation::Sell),
            "NEUTRAL" => Some(Recommendation::Neutral),
            "BUY" => Some(Recommendation::Buy),
            "STRONG_BUY" => Some(Recommendation::StrongBuy),
            _ => None,
        }
    }

    pub fn is_buy_family(self) -> bool {
        matches!(self, Recommendation::Buy | Recommendation::StrongBuy)
    }

    pub fn is_sell_family(self) -> bool {
        matches!(self, Recommendation::Sell | Recommendation::StrongSell)
    }
}

/// Aggregate signal for an instrument that is not held yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSignal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSignal::StrongBuy => write!(f, "strong_buy"),
            TradeSignal::Buy => write!(f, "buy"),
            TradeSignal::Neutral => write!(f, "neutral"),
            TradeSignal::Sell => write!(f, "sell"),
        }
    }
}

impl TradeSignal {
    pub fn is_buy(self) -> bool {
        matches!(self, TradeSignal::Buy | TradeSignal::StrongBuy)
    }
}

/// Aggregate strength reading for a held instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStrength {
    VeryStrong,
    Strong,
    Neutral,
    Weak,
    VeryWeak,
}

impl fmt::Display for PositionStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStrength::VeryStrong => write!(f, "very_strong"),
            PositionStrength::Strong => write!(f, "strong"),
            PositionStrength::Neutral => write!(f, "neutral"),
            PositionStrength::Weak => write!(f, "weak"),
            PositionStrength::VeryWeak => write!(f, "very_weak"),
        }
    }
}

/// Action suggested for a held position after one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSignal {
    Hold,
    TakeProfit,
    CutLoss,
    TrailingStop,
    TrailingProfit,
}

impl fmt::Display for PositionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSignal::Hold => write!(f, "hold"),
            PositionSignal::TakeProfit => write!(f, "take_profit"),
            PositionSignal::CutLoss => write!(f, "cut_loss"),
            PositionSignal::TrailingStop => write!(f, "trailing_stop"),
            PositionSignal::TrailingProfit => write!(f, "trailing_profit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Safe,
    Warning,
    Dangerous,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Safe => write!(f, "safe"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Dangerous => write!(f, "dangerous"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelType {
    Support,
    Resistance,
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelType::Support => write!(f, "support"),
            LevelType::Resistance => write!(f, "resistance"),
        }
    }
}
