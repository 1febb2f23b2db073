use chrono::{DateTime, Duration, Utc};

use crate::config::{parse_weights, Config};
use crate::models::{Candle, CandleSeries, IndicatorSnapshot, Recommendation, StockAnalysis, Timeframe};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn candle(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle {
        timestamp: base_time(),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Create candles from (open, high, low, close) tuples with daily timestamps and volume 100.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let base = base_time();
    let candles: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle {
            timestamp: base + Duration::days(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        })
        .collect();
    CandleSeries::new(candles)
}

/// `n` identical candles spanning `[low, high]`.
pub fn flat_candles(n: usize, low: f64, high: f64) -> CandleSeries {
    let mid = (low + high) / 2.0;
    make_candles(&vec![(mid, high, low, mid); n])
}

/// 30m:1, 4h:2, 1d:3.
pub fn default_test_config() -> Config {
    Config::with_weights(parse_weights("30m:1,4h:2,1d:3"))
}

pub fn analysis_with_summary(timeframe: Timeframe, summary: Recommendation) -> StockAnalysis {
    let indicators = IndicatorSnapshot {
        summary,
        ..Default::default()
    };
    StockAnalysis::new(timeframe, indicators, CandleSeries::default())
}

/// A healthy uptrend reading around `price`.
pub fn bullish_snapshot(price: f64) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot {
        summary: Recommendation::StrongBuy,
        close: price,
        ..Default::default()
    };
    snap.oscillators.rsi = 60.0;
    snap.oscillators.macd = 1.0;
    snap.oscillators.macd_signal = 0.5;
    snap.oscillators.stoch_k = 60.0;
    snap.moving_averages.ema10 = price * 0.99;
    snap.moving_averages.ema20 = price * 0.98;
    snap.moving_averages.ema50 = price * 0.95;
    snap.moving_averages.ema100 = price * 0.92;
    snap.moving_averages.ema200 = price * 0.90;
    snap
}

/// A downtrend reading around `price`.
pub fn bearish_snapshot(price: f64) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot {
        summary: Recommendation::StrongSell,
        close: price,
        ..Default::default()
    };
    snap.oscillators.rsi = 25.0;
    snap.oscillators.macd = -1.0;
    snap.oscillators.macd_signal = -0.5;
    snap.oscillators.stoch_k = 10.0;
    snap.moving_averages.ema10 = price * 1.01;
    snap.moving_averages.ema20 = price * 1.02;
    snap.moving_averages.ema50 = price * 1.05;
    snap.moving_averages.ema100 = price * 1.08;
    snap.moving_averages.ema200 = price * 1.10;
    snap
}

/// Twenty quiet candles around `price` followed by `last`.
pub fn history_ending_with(price: f64, last: Candle) -> CandleSeries {
    let mut series = CandleSeries::default();
    for _ in 0..20 {
        series.push(candle(price, price * 1.005, price * 0.995, price * 1.001, 100.0));
    }
    series.push(last);
    series
}
