use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::levels::{extract_all_levels, extract_levels};
use crate::core::scoring::{score_position, Insight, ScoreInput};
use crate::core::signal::aggregate;
use crate::core::trade_plan::{EmaContext, PriceBucket, TradePlan, TradePlanCalculator};
use crate::error::{EngineError, Result};
use crate::models::{find_analysis, StockAnalysis, Timeframe, TradeSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Valid,
    NoSetup,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Valid => write!(f, "valid"),
            PlanStatus::NoSetup => write!(f, "no_setup"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradePlanResult {
    pub main_interval: Timeframe,
    pub signal: TradeSignal,
    pub total_score: i32,
    pub last_price: f64,
    #[serde(flatten)]
    pub plan: TradePlan,
    pub score: f64,
    pub status: PlanStatus,
    pub is_buy_signal: bool,
    pub insights: Vec<Insight>,
}

impl TradePlanResult {
    pub fn passes_min_score(&self, min_score: f64) -> bool {
        self.status == PlanStatus::Valid && self.score >= min_score
    }
}

pub fn plan_trade(
    cfg: &Config,
    analyses: &[StockAnalysis],
    buckets: &[PriceBucket],
) -> Result<TradePlanResult> {
    let signal_score = aggregate(cfg, analyses)?;
    let main_tf = signal_score.main_timeframe;
    let main = find_analysis(analyses, main_tf).ok_or(EngineError::MainTrendNotFound(main_tf))?;
    let last_price = main.last_price().ok_or(EngineError::MissingPrice(main_tf))?;
    let signal = signal_score.trade_signal();

    let levels = extract_all_levels(analyses);
    let emas = EmaContext::from_analyses(analyses, main_tf);
    let plan = TradePlanCalculator::from_config(cfg).calculate(last_price, &levels, &emas, buckets);

    if plan.is_empty() {
        debug!("No setup at {:.2} on {}", last_price, main_tf);
        return Ok(TradePlanResult {
            main_interval: main_tf,
            signal,
            total_score: signal_score.total_score,
            last_price,
            plan,
            score: 0.0,
            status: PlanStatus::NoSetup,
            is_buy_signal: false,
            insights: Vec::new(),
        });
    }

    let main_levels = extract_levels(main);
    let secondary = cfg
        .secondary_trend(analyses)
        .and_then(|tf| find_analysis(analyses, tf));
    let report = score_position(&ScoreInput {
        main,
        secondary,
        levels: &main_levels,
        last_price,
        entry_price: plan.entry,
        planned_stop_loss: plan.stop_loss,
        stop_loss: plan.stop_loss,
        take_profit: plan.take_profit,
    });

    let is_buy_signal = signal.is_buy();
    info!(
        "Plan {} @ {:.2}: SL {:.2} TP {:.2} R:R {:.2} score {:.1}",
        signal, plan.entry, plan.stop_loss, plan.take_profit, plan.risk_reward, report.breakdown.total
    );

    Ok(TradePlanResult {
        main_interval: main_tf,
        signal,
        total_score: signal_score.total_score,
        last_price,
        plan,
        score: report.breakdown.total,
        status: PlanStatus::Valid,
        is_buy_signal,
        insights: report.insights,
    })
}
