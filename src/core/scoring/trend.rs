use super::{FactorScore, Insight};
use crate::models::{MovingAverages, Recommendation, StockAnalysis};

const SUMMARY_POINTS: f64 = 25.0;
const EMA200_PENALTY: f64 = 30.0;
const EMA_MIN: f64 = -30.0;
const EMA_MAX: f64 = 50.0;

/// EMA period and the points earned for trading above it.
const EMA_LADDER: [(u32, f64); 4] = [(10, 5.0), (20, 10.0), (50, 15.0), (100, 20.0)];

fn ema(mas: &MovingAverages, period: u32) -> f64 {
    match period {
        10 => mas.ema10,
        20 => mas.ema20,
        50 => mas.ema50,
        100 => mas.ema100,
        _ => mas.ema200,
    }
}

pub fn score(analysis: &StockAnalysis, price: f64) -> FactorScore {
    let mut insights = Vec::new();
    let summary = analysis.indicators.summary;
    let mas = &analysis.indicators.moving_averages;

    let summary_part = summary.code() as f64 * SUMMARY_POINTS;
    match summary {
        Recommendation::StrongBuy => {
            insights.push(Insight::new(format!("{} trend is strong buy", analysis.timeframe), 80))
        }
        Recommendation::StrongSell => {
            insights.push(Insight::new(format!("{} trend is strong sell", analysis.timeframe), 90))
        }
        Recommendation::Sell => {
            insights.push(Insight::new(format!("{} trend turned to sell", analysis.timeframe), 70))
        }
        _ => {}
    }

    let mut ema_part = 0.0;
    let mut above = 0;
    for (period, points) in EMA_LADDER {
        let value = ema(mas, period);
        if value > 0.0 && price > value {
            ema_part += points;
            above += 1;
        }
    }
    if above == EMA_LADDER.len() {
        insights.push(Insight::new("Price holds above EMA10/20/50/100", 60));
    }
    if mas.ema200 > 0.0 && price < mas.ema200 {
        ema_part -= EMA200_PENALTY;
        insights.push(Insight::new(
            format!("Price {:.2} is below EMA200 {:.2}", price, mas.ema200),
            75,
        ));
    }

    FactorScore::new(summary_part + ema_part.clamp(EMA_MIN, EMA_MAX), insights)
}
