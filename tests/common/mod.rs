#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use position_advisor::config::{parse_weights, Config};
use position_advisor::models::{
    Candle, CandleSeries, IndicatorSnapshot, Recommendation, StockAnalysis, Timeframe,
};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Single candle at the base timestamp.
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

/// Twenty quiet daily candles around `price` (volume 100) followed by `last`.
pub fn history_ending_with(price: f64, last: Candle) -> CandleSeries {
    let base = base_time();
    let mut candles: Vec<Candle> = (0..20)
        .map(|i| Candle {
            timestamp: base + Duration::days(i),
            open: price,
            high: price * 1.005,
            low: price * 0.995,
            close: price * 1.001,
            volume: 100.0,
        })
        .collect();
    candles.push(Candle {
        timestamp: base + Duration::days(20),
        ..last
    });
    CandleSeries::new(candles)
}

/// 30m:1, 4h:2, 1d:3.
pub fn test_config() -> Config {
    Config::with_weights(parse_weights("30m:1,4h:2,1d:3"))
}

/// Uptrend reading: EMAs stacked below `price`, RSI 60, MACD above signal.
pub fn bullish_snapshot(price: f64, summary: Recommendation) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot {
        summary,
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

pub fn summary_only(timeframe: Timeframe, summary: Recommendation) -> StockAnalysis {
    let indicators = IndicatorSnapshot {
        summary,
        ..Default::default()
    };
    StockAnalysis::new(timeframe, indicators, CandleSeries::default())
}

/// Daily analysis whose last candle is `last`, preceded by quiet candles at `history_price`.
pub fn daily(history_price: f64, last: Candle, summary: Recommendation) -> StockAnalysis {
    let snap = bullish_snapshot(last.close, summary);
    StockAnalysis::new(Timeframe::D1, snap, history_ending_with(history_price, last))
}
