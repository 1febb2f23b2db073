use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::models::{PositionStrength, Recommendation, StockAnalysis, Timeframe, TradeSignal};

const STRONG_THRESHOLD: i32 = 9;
const BUY_THRESHOLD: i32 = 6;
const NEUTRAL_THRESHOLD: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalScore {
    pub total_score: i32,
    pub main_timeframe: Timeframe,
    pub main_trend_score: i32,
}

impl SignalScore {
    pub fn trade_signal(&self) -> TradeSignal {
        let main = self.main_trend_score;
        if self.total_score >= STRONG_THRESHOLD && main >= Recommendation::Buy.code() {
            TradeSignal::StrongBuy
        } else if self.total_score >= BUY_THRESHOLD && main >= Recommendation::Buy.code() {
            TradeSignal::Buy
        } else if self.total_score >= NEUTRAL_THRESHOLD && main >= Recommendation::Neutral.code() {
            TradeSignal::Neutral
        } else {
            TradeSignal::Sell
        }
    }

    pub fn position_strength(&self) -> PositionStrength {
        let main = self.main_trend_score;
        if self.total_score >= STRONG_THRESHOLD && main >= Recommendation::Buy.code() {
            PositionStrength::VeryStrong
        } else if self.total_score >= BUY_THRESHOLD && main >= Recommendation::Buy.code() {
            PositionStrength::Strong
        } else if self.total_score >= NEUTRAL_THRESHOLD && main >= Recommendation::Neutral.code() {
            PositionStrength::Neutral
        } else if self.total_score >= 0 {
            PositionStrength::Weak
        } else {
            PositionStrength::VeryWeak
        }
    }
}

pub fn aggregate(cfg: &Config, analyses: &[StockAnalysis]) -> Result<SignalScore> {
    if analyses.is_empty() {
        return Err(EngineError::NoAnalyses);
    }
    let main_timeframe = cfg.main_trend().ok_or(EngineError::NoTimeframeWeights)?;

    let mut total_score = 0;
    let mut main_trend_score = None;
    for analysis in analyses {
        let Some(weight) = cfg.weight_of(analysis.timeframe) else {
            warn!("No weight configured for timeframe {}, skipping", analysis.timeframe);
            continue;
        };
        let code = analysis.indicators.summary.code();
        total_score += weight * code;
        if analysis.timeframe == main_timeframe {
            main_trend_score = Some(code);
        }
    }

    let main_trend_score = main_trend_score.ok_or(EngineError::MainTrendNotFound(main_timeframe))?;
    debug!(
        "Signal score {} (main {} = {})",
        total_score, main_timeframe, main_trend_score
    );

    Ok(SignalScore {
        total_score,
        main_timeframe,
        main_trend_score,
    })
}

pub fn evaluate_signal(cfg: &Config, analyses: &[StockAnalysis]) -> Result<TradeSignal> {
    Ok(aggregate(cfg, analyses)?.trade_signal())
}

pub fn evaluate_position(cfg: &Config, analyses: &[StockAnalysis]) -> Result<PositionStrength> {
    Ok(aggregate(cfg, analyses)?.position_strength())
}
