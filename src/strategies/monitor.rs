use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::core::levels::extract_levels;
use crate::core::scoring::{rank_insights, score_position, Insight, ScoreBreakdown, ScoreInput};
use crate::core::signal::aggregate;
use crate::core::trailing::{self, TrailingContext};
use crate::error::{EngineError, Result};
use crate::models::{
    effective_stop, find_analysis, HealthStatus, PositionSignal, PositionStrength, Recommendation,
    StockAnalysis, StockPosition, Timeframe, TrailingState,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub summary: Recommendation,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub stoch_k: f64,
    pub adx: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
}

impl IndicatorSummary {
    fn from_analysis(analysis: &StockAnalysis) -> Self {
        let ind = &analysis.indicators;
        Self {
            summary: ind.summary,
            rsi: ind.oscillators.rsi,
            macd: ind.oscillators.macd,
            macd_signal: ind.oscillators.macd_signal,
            stoch_k: ind.oscillators.stoch_k,
            adx: ind.oscillators.adx,
            ema20: ind.moving_averages.ema20,
            ema50: ind.moving_averages.ema50,
            ema200: ind.moving_averages.ema200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionAnalysis {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub last_price: f64,
    pub entry_price: f64,
    /// Effective stop after this cycle (planned or trailing, whichever is higher).
    pub stop_loss_price: f64,
    /// Trailing floor while trailing profit is active, else the planned target.
    pub take_profit_price: f64,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub status: HealthStatus,
    pub signal: PositionSignal,
    pub strength: PositionStrength,
    pub trailing_stop_price: Option<f64>,
    pub trailing_profit_price: Option<f64>,
    pub highest_price_since_ttp: Option<f64>,
    pub insights: Vec<Insight>,
    pub indicators: IndicatorSummary,
}

#[derive(Debug, Clone)]
pub struct PositionEvaluation {
    pub analysis: PositionAnalysis,
    pub trailing: TrailingState,
}

/// Evaluate one held position. The position is not modified; persist
/// `trailing` with [`StockPosition::apply_trailing`].
pub fn monitor_position(
    cfg: &Config,
    position: &StockPosition,
    analyses: &[StockAnalysis],
) -> Result<PositionEvaluation> {
    let signal_score = aggregate(cfg, analyses)?;
    let main_tf = signal_score.main_timeframe;
    let main = find_analysis(analyses, main_tf).ok_or(EngineError::MainTrendNotFound(main_tf))?;
    let last_price = main.last_price().ok_or(EngineError::MissingPrice(main_tf))?;

    let secondary = cfg
        .secondary_trend(analyses)
        .and_then(|tf| find_analysis(analyses, tf));
    if secondary.is_none() {
        warn!("{}: no secondary timeframe, skipping multi-timeframe factor", position.symbol);
    }

    let levels = extract_levels(main);
    let report = score_position(&ScoreInput {
        main,
        secondary,
        levels: &levels,
        last_price,
        entry_price: position.buy_price,
        planned_stop_loss: position.stop_loss_price,
        stop_loss: position.effective_stop_loss(),
        take_profit: position.take_profit_price,
    });
    let score = report.breakdown.total;

    let decision = trailing::step(
        position,
        &TrailingContext {
            main,
            secondary,
            last_price,
            signal: signal_score.trade_signal(),
            score,
        },
    );

    let mut insights = decision.insights;
    insights.extend(report.insights);
    rank_insights(&mut insights);

    let state = decision.state;
    info!(
        "{} @ {:.2}: {} / {} (score {:.1})",
        position.symbol, last_price, decision.signal, decision.status, score
    );

    let analysis = PositionAnalysis {
        symbol: position.symbol.clone(),
        timeframe: main_tf,
        last_price,
        entry_price: position.buy_price,
        stop_loss_price: effective_stop(position.stop_loss_price, &state),
        take_profit_price: state
            .trailing_profit_price
            .unwrap_or(position.take_profit_price),
        score,
        breakdown: report.breakdown,
        status: decision.status,
        signal: decision.signal,
        strength: signal_score.position_strength(),
        trailing_stop_price: state.trailing_stop_price,
        trailing_profit_price: state.trailing_profit_price,
        highest_price_since_ttp: state.highest_price_since_ttp,
        insights,
        indicators: IndicatorSummary::from_analysis(main),
    };

    Ok(PositionEvaluation {
        analysis,
        trailing: state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candle, IndicatorSnapshot};
    use crate::test_helpers::{
        analysis_with_summary, bearish_snapshot, bullish_snapshot, candle, default_test_config,
        history_ending_with,
    };

    fn daily(snap: IndicatorSnapshot, last: Candle) -> StockAnalysis {
        let price = last.open;
        StockAnalysis::new(Timeframe::D1, snap, history_ending_with(price, last))
    }

    #[test]
    fn healthy_position_holds() {
        let cfg = default_test_config();
        let analyses = vec![
            analysis_with_summary(Timeframe::H4, Recommendation::Buy),
            daily(bullish_snapshot(104.0), candle(103.0, 104.3, 102.9, 104.0, 110.0)),
        ];
        let pos = StockPosition::new("ACME", 100.0, 95.0, 115.0);
        let eval = monitor_position(&cfg, &pos, &analyses).unwrap();
        let a = &eval.analysis;
        assert_eq!(a.signal, PositionSignal::Hold);
        assert_eq!(a.status, HealthStatus::Safe);
        assert_eq!(a.timeframe, Timeframe::D1);
        assert_eq!(a.last_price, 104.0);
        assert_eq!(a.stop_loss_price, 95.0);
        assert_eq!(a.take_profit_price, 115.0);
        assert_eq!(a.indicators.summary, Recommendation::StrongBuy);
        assert!(a.breakdown.multi_timeframe.is_some());
        assert!(a.insights.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn breakeven_trailing_stop_keeps_health_score() {
        let cfg = default_test_config();
        let analyses = vec![
            analysis_with_summary(Timeframe::H4, Recommendation::Buy),
            daily(bullish_snapshot(104.0), candle(103.0, 104.3, 102.9, 104.0, 110.0)),
        ];
        let open = StockPosition::new("ACME", 100.0, 95.0, 115.0);
        let mut protected = open.clone();
        protected.trailing_stop_price = Some(100.0);

        let base = monitor_position(&cfg, &open, &analyses).unwrap().analysis;
        let trailed = monitor_position(&cfg, &protected, &analyses).unwrap().analysis;
        assert_eq!(trailed.stop_loss_price, 100.0);
        assert!(trailed.breakdown.health >= base.breakdown.health);
        assert!(trailed.score >= base.score);
    }

    #[test]
    fn price_below_stop_cuts_loss_with_dangerous_status() {
        let cfg = default_test_config();
        let analyses = vec![daily(bullish_snapshot(94.0), candle(95.5, 95.6, 93.8, 94.0, 100.0))];
        let pos = StockPosition::new("ACME", 100.0, 95.0, 115.0);
        let eval = monitor_position(&cfg, &pos, &analyses).unwrap();
        assert_eq!(eval.analysis.signal, PositionSignal::CutLoss);
        assert_eq!(eval.analysis.status, HealthStatus::Dangerous);
        assert_eq!(eval.analysis.insights[0].weight, 100);
        assert_eq!(eval.trailing, pos.trailing_state());
    }

    #[test]
    fn bearish_position_is_flagged() {
        let cfg = default_test_config();
        let analyses = vec![daily(bearish_snapshot(97.0), candle(98.0, 98.2, 96.8, 97.0, 300.0))];
        let pos = StockPosition::new("ACME", 100.0, 95.0, 115.0);
        let eval = monitor_position(&cfg, &pos, &analyses).unwrap();
        assert_ne!(eval.analysis.status, HealthStatus::Safe);
        assert_eq!(eval.analysis.strength, PositionStrength::VeryWeak);
        assert!(eval.analysis.breakdown.multi_timeframe.is_none());
    }

    #[test]
    fn missing_main_timeframe_is_an_error() {
        let cfg = default_test_config();
        let analyses = vec![analysis_with_summary(Timeframe::H4, Recommendation::Buy)];
        let pos = StockPosition::new("ACME", 100.0, 95.0, 115.0);
        assert!(matches!(
            monitor_position(&cfg, &pos, &analyses),
            Err(EngineError::MainTrendNotFound(Timeframe::D1))
        ));
    }
}
