use super::{FactorScore, Insight};
use crate::models::CandleSeries;

const VOLUME_PERIOD: usize = 20;
const VOLUME_SPIKE: f64 = 2.0;
const VOLUME_DRY: f64 = 0.7;

pub fn score(candles: &CandleSeries) -> FactorScore {
    let mut insights = Vec::new();
    let Some(last) = candles.last() else {
        return FactorScore::new(50.0, insights);
    };

    let mut total = 50.0;
    if last.is_strong_bullish() {
        total += 30.0;
        insights.push(Insight::new("Strong bullish candle", 50));
    }
    if candles.ends_with_bearish_engulfing() {
        total -= 40.0;
        insights.push(Insight::new("Bearish engulfing on the last candle", 85));
    }
    if last.is_bearish() {
        total -= 15.0;
    }

    if let Some(ratio) = candles.volume_ratio(VOLUME_PERIOD) {
        if ratio > VOLUME_SPIKE {
            if last.is_bullish() {
                total += 20.0;
                insights.push(Insight::new(format!("Buying volume {:.1}x average", ratio), 55));
            } else if last.is_bearish() {
                total -= 30.0;
                insights.push(Insight::new(format!("Selling volume {:.1}x average", ratio), 80));
            }
        } else if ratio < VOLUME_DRY {
            total -= 10.0;
            insights.push(Insight::new("Volume is drying up", 30));
        }
    }

    FactorScore::new(total, insights)
}
