use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::scoring::Insight;
use crate::models::{
    effective_stop, HealthStatus, PositionSignal, StockAnalysis, StockPosition, TradeSignal,
    TrailingState,
};

pub const TTP_FLOOR_RATIO: f64 = 0.97;
const CONTINUATION_VOLUME: f64 = 1.5;
const CONTINUATION_RSI_CAP: f64 = 85.0;
const VOLUME_PERIOD: usize = 20;
/// Share of the planned profit range after which the stop starts trailing.
const PROFIT_TRIGGER: f64 = 0.6;
/// Minimum distance of a secondary R1 above entry for a breakout to count.
const BREAKOUT_MIN_GAP: f64 = 0.01;
/// Price-to-stop buffer, relative to the original risk, below which a position is dangerous.
const DANGER_BUFFER: f64 = 0.25;
const SAFE_SCORE: f64 = 50.0;
const WARNING_SCORE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Positive,
    Uncertain,
    Negative,
}

pub fn continuation_outlook(main: &StockAnalysis) -> Outlook {
    let rsi = main.indicators.oscillators.rsi;
    if rsi >= CONTINUATION_RSI_CAP {
        return Outlook::Negative;
    }
    let Some(last) = main.candles.last() else {
        return Outlook::Uncertain;
    };
    let heavy = main
        .candles
        .volume_ratio(VOLUME_PERIOD)
        .is_some_and(|r| r > CONTINUATION_VOLUME);
    if last.is_strong_bullish() && heavy {
        Outlook::Positive
    } else if last.is_bearish() && heavy {
        Outlook::Negative
    } else {
        Outlook::Uncertain
    }
}

pub struct TrailingContext<'a> {
    pub main: &'a StockAnalysis,
    pub secondary: Option<&'a StockAnalysis>,
    pub last_price: f64,
    pub signal: TradeSignal,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct TrailingDecision {
    pub signal: PositionSignal,
    pub status: HealthStatus,
    pub state: TrailingState,
    pub insights: Vec<Insight>,
}

/// One cycle of the position state machine. The position is read only; the
/// returned state is what the caller persists.
pub fn step(position: &StockPosition, ctx: &TrailingContext) -> TrailingDecision {
    let state = position.trailing_state();
    let stop = effective_stop(position.stop_loss_price, &state);
    let last = ctx.last_price;
    let mut insights = Vec::new();

    if last <= stop {
        info!("{} hit stop {:.2} at {:.2}", position.symbol, stop, last);
        insights.push(Insight::new(
            format!("Price {:.2} broke the stop loss {:.2}, cut the loss", last, stop),
            100,
        ));
        return TrailingDecision {
            signal: PositionSignal::CutLoss,
            status: HealthStatus::Dangerous,
            state,
            insights,
        };
    }

    let mut next = state;
    let mut signal = PositionSignal::Hold;

    if let Some(ttp) = state.trailing_profit_price {
        signal = manage_trailing_profit(ttp, &state, ctx, &mut next, &mut insights);
    } else if position.take_profit_price > 0.0 && last >= position.take_profit_price {
        signal = activate_trailing_profit(position.take_profit_price, ctx, &mut next, &mut insights);
    }

    if let Some(raised) = trailing_stop_candidate(position, ctx, stop) {
        debug!("{} trailing stop {:.2} -> {:.2}", position.symbol, stop, raised);
        next.trailing_stop_price = Some(raised);
        insights.push(Insight::new(
            format!("Stop loss raised to {:.2}", raised),
            75,
        ));
        if signal == PositionSignal::Hold {
            signal = PositionSignal::TrailingStop;
        }
    }

    let status = final_status(position, stop, ctx);
    TrailingDecision {
        signal,
        status,
        state: next,
        insights,
    }
}

fn activate_trailing_profit(
    tp: f64,
    ctx: &TrailingContext,
    next: &mut TrailingState,
    insights: &mut Vec<Insight>,
) -> PositionSignal {
    if continuation_outlook(ctx.main) == Outlook::Positive {
        info!("Target {:.2} reached with momentum, trailing profit from {:.2}", tp, tp);
        next.trailing_profit_price = Some(tp);
        next.highest_price_since_ttp = Some(ctx.last_price);
        insights.push(Insight::new(
            format!("Target {:.2} reached with strong momentum, letting profit run", tp),
            90,
        ));
        PositionSignal::TrailingProfit
    } else {
        insights.push(Insight::new(format!("Target {:.2} reached, take profit", tp), 95));
        PositionSignal::TakeProfit
    }
}

fn manage_trailing_profit(
    ttp: f64,
    state: &TrailingState,
    ctx: &TrailingContext,
    next: &mut TrailingState,
    insights: &mut Vec<Insight>,
) -> PositionSignal {
    let last = ctx.last_price;
    let peak = state.highest_price_since_ttp.unwrap_or(ttp).max(last);
    let floor = ttp.max(peak * TTP_FLOOR_RATIO);
    next.highest_price_since_ttp = Some(peak);
    next.trailing_profit_price = Some(floor);

    let exit_reason = if continuation_outlook(ctx.main) == Outlook::Negative {
        Some("momentum is fading")
    } else if last <= floor {
        Some("price fell to the trailing floor")
    } else if ctx.main.candles.ends_with_bearish_engulfing() {
        Some("bearish engulfing formed")
    } else if ctx.main.indicators.summary.is_sell_family() {
        Some("the main trend turned bearish")
    } else {
        None
    };

    match exit_reason {
        Some(reason) => {
            info!("Trailing profit exit at {:.2}: {}", last, reason);
            insights.push(Insight::new(
                format!("Take profit at {:.2}, {}", last, reason),
                95,
            ));
            PositionSignal::TakeProfit
        }
        None => {
            insights.push(Insight::new(
                format!("Trailing profit: peak {:.2}, floor {:.2}", peak, floor),
                70,
            ));
            PositionSignal::TrailingProfit
        }
    }
}

fn trailing_stop_candidate(position: &StockPosition, ctx: &TrailingContext, stop: f64) -> Option<f64> {
    let entry = position.buy_price;
    let last = ctx.last_price;
    let range = position.take_profit_price - entry;
    let in_profit = ctx.signal.is_buy() && range > 0.0 && last - entry > PROFIT_TRIGGER * range;

    let broken_r1 = ctx
        .secondary
        .map(|s| s.indicators.pivots.classic.r1)
        .filter(|&r1| r1 > 0.0 && r1 >= entry * (1.0 + BREAKOUT_MIN_GAP) && last > r1);

    if !in_profit && broken_r1.is_none() {
        return None;
    }

    let previous_low = ctx.main.candles.previous().map(|c| c.low);
    [Some(entry), broken_r1, previous_low]
        .into_iter()
        .flatten()
        .filter(|&c| c > 0.0 && c < last)
        .max_by(|a, b| a.total_cmp(b))
        .filter(|&best| best > stop)
}

fn final_status(position: &StockPosition, stop: f64, ctx: &TrailingContext) -> HealthStatus {
    let risk = position.buy_price - position.stop_loss_price;
    if risk > 0.0 && (ctx.last_price - stop) / risk < DANGER_BUFFER {
        return HealthStatus::Dangerous;
    }
    if ctx.score >= SAFE_SCORE {
        HealthStatus::Safe
    } else if ctx.score >= WARNING_SCORE {
        HealthStatus::Warning
    } else {
        HealthStatus::Dangerous
    }
}
