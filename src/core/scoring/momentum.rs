use super::{FactorScore, Insight};
use crate::models::Oscillators;

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_MIDLINE: f64 = 50.0;
const RSI_OVERSOLD: f64 = 30.0;
const STOCH_OVERBOUGHT: f64 = 80.0;
const STOCH_OVERSOLD: f64 = 20.0;
const MACD_POINTS: f64 = 15.0;
/// |MACD - signal| relative to price above which the cross counts as strong.
const MACD_STRONG_GAP: f64 = 0.002;
const MACD_STRONG_POINTS: f64 = 10.0;

pub fn score(osc: &Oscillators, price: f64) -> FactorScore {
    let mut insights = Vec::new();
    let mut total = 0.0;

    let rsi = osc.rsi;
    if rsi > RSI_OVERBOUGHT {
        total -= 20.0;
        insights.push(Insight::new(format!("RSI {:.1} is overbought", rsi), 65));
    } else if rsi >= RSI_MIDLINE {
        total += 40.0 * (rsi - RSI_MIDLINE) / (RSI_OVERBOUGHT - RSI_MIDLINE);
    } else if rsi >= RSI_OVERSOLD {
        total += 20.0;
    } else {
        total -= 10.0;
        insights.push(Insight::new(format!("RSI {:.1} is oversold", rsi), 55));
    }

    let gap = osc.macd - osc.macd_signal;
    total += MACD_POINTS * sign(gap);
    total += MACD_POINTS * sign(osc.macd);
    if price > 0.0 && gap.abs() / price >= MACD_STRONG_GAP {
        total += MACD_STRONG_POINTS * sign(gap);
        let text = if gap > 0.0 {
            "MACD is well above its signal line"
        } else {
            "MACD is well below its signal line"
        };
        insights.push(Insight::new(text, 50));
    }

    let stoch = osc.stoch_k;
    if stoch > STOCH_OVERBOUGHT {
        total -= 10.0;
        insights.push(Insight::new(format!("Stochastic {:.1} is overbought", stoch), 40));
    } else if stoch >= STOCH_OVERSOLD {
        total += 30.0;
    } else {
        total -= 5.0;
    }

    FactorScore::new(total, insights)
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
