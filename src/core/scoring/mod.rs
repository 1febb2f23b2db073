pub mod health;
pub mod momentum;
pub mod multi_timeframe;
pub mod price_action;
pub mod trend;

use serde::{Deserialize, Serialize};

use crate::core::levels::LevelSet;
use crate::models::StockAnalysis;

const TREND_WEIGHT: f64 = 0.35;
const MOMENTUM_WEIGHT: f64 = 0.25;
const HEALTH_WEIGHT: f64 = 0.20;
const PRICE_ACTION_WEIGHT: f64 = 0.15;
const MULTI_TIMEFRAME_WEIGHT: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub weight: u8,
}

impl Insight {
    pub fn new(text: impl Into<String>, weight: u8) -> Self {
        Self {
            text: text.into(),
            weight: weight.min(100),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FactorScore {
    pub score: f64,
    pub insights: Vec<Insight>,
}

impl FactorScore {
    fn new(score: f64, insights: Vec<Insight>) -> Self {
        Self {
            score: clamp_score(score),
            insights,
        }
    }
}

pub struct ScoreInput<'a> {
    pub main: &'a StockAnalysis,
    pub secondary: Option<&'a StockAnalysis>,
    pub levels: &'a LevelSet,
    pub last_price: f64,
    pub entry_price: f64,
    /// Stop set when the position was opened; anchors the risk range.
    pub planned_stop_loss: f64,
    /// Stop in force now (planned or trailing, whichever is higher).
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub trend: f64,
    pub momentum: f64,
    pub health: f64,
    pub price_action: f64,
    pub multi_timeframe: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub breakdown: ScoreBreakdown,
    pub insights: Vec<Insight>,
}

pub fn score_position(input: &ScoreInput) -> ScoreReport {
    let trend = trend::score(input.main, input.last_price);
    let momentum = momentum::score(&input.main.indicators.oscillators, input.last_price);
    let health = health::score(input);
    let price_action = price_action::score(&input.main.candles);
    let mtf = input.secondary.map(|secondary| {
        multi_timeframe::score(
            input.main.indicators.summary,
            secondary.indicators.summary,
            secondary.timeframe,
        )
    });

    let mut total = trend.score * TREND_WEIGHT
        + momentum.score * MOMENTUM_WEIGHT
        + health.score * HEALTH_WEIGHT
        + price_action.score * PRICE_ACTION_WEIGHT;
    if let Some(m) = &mtf {
        total += m.score * MULTI_TIMEFRAME_WEIGHT;
    }

    let breakdown = ScoreBreakdown {
        trend: round2(trend.score),
        momentum: round2(momentum.score),
        health: round2(health.score),
        price_action: round2(price_action.score),
        multi_timeframe: mtf.as_ref().map(|m| round2(m.score)),
        total: round2(clamp_score(total)),
    };

    let mut insights: Vec<Insight> = trend
        .insights
        .into_iter()
        .chain(momentum.insights)
        .chain(health.insights)
        .chain(price_action.insights)
        .chain(mtf.into_iter().flat_map(|m| m.insights))
        .collect();
    rank_insights(&mut insights);

    ScoreReport {
        breakdown,
        insights,
    }
}

pub fn rank_insights(insights: &mut [Insight]) {
    insights.sort_by(|a, b| b.weight.cmp(&a.weight));
}

pub fn clamp_score(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 100.0)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
