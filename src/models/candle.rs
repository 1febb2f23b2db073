use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Body share of the range above which a green candle counts as strong.
const STRONG_BODY_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn total_range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Green candle whose body covers at least 70% of its range.
    pub fn is_strong_bullish(&self) -> bool {
        let range = self.total_range();
        self.is_bullish() && range > 0.0 && self.body() / range >= STRONG_BODY_RATIO
    }

    /// True when `[low, high]` intersects `[level - tolerance, level + tolerance]`.
    pub fn touches(&self, level: f64, tolerance: f64) -> bool {
        self.low <= level + tolerance && self.high >= level - tolerance
    }

    /// Red candle whose body swallows the previous green body.
    pub fn engulfs_bearish(&self, previous: &Candle) -> bool {
        previous.is_bullish()
            && self.is_bearish()
            && self.open >= previous.close
            && self.close <= previous.open
    }
}

/// Ordered (ascending time) OHLCV history for one timeframe.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// Decode a JSON array of OHLCV objects.
    pub fn from_json(raw: &str) -> Result<Self> {
        let candles: Vec<Candle> = serde_json::from_str(raw)?;
        Ok(Self::new(candles))
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The candle before the last one.
    pub fn previous(&self) -> Option<&Candle> {
        self.candles.len().checked_sub(2).and_then(|i| self.candles.get(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Number of candles whose range intersects the tolerance band around `level`.
    pub fn count_touches(&self, level: f64, tolerance: f64) -> usize {
        self.candles
            .iter()
            .filter(|c| c.touches(level, tolerance))
            .count()
    }

    /// Mean volume of up to `period` candles preceding the last one.
    pub fn average_volume(&self, period: usize) -> f64 {
        let end = self.candles.len().saturating_sub(1);
        let start = end.saturating_sub(period);
        let window = &self.candles[start..end];
        if window.is_empty() {
            return 0.0;
        }
        window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64
    }

    /// Last candle's volume relative to the preceding `period`-candle average.
    /// `None` when there is no usable average.
    pub fn volume_ratio(&self, period: usize) -> Option<f64> {
        let last = self.last()?;
        let avg = self.average_volume(period);
        if avg > 0.0 {
            Some(last.volume / avg)
        } else {
            None
        }
    }

    /// Bearish engulfing formed by the last two candles.
    pub fn ends_with_bearish_engulfing(&self) -> bool {
        match (self.previous(), self.last()) {
            (Some(prev), Some(last)) => last.engulfs_bearish(prev),
            _ => false,
        }
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }
}

impl std::ops::Index<usize> for CandleSeries {
    type Output = Candle;
    fn index(&self, index: usize) -> &Self::Output {
        &self.candles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{candle, make_candles};

    #[test]
    fn candle_body_and_range() {
        let c = candle(100.0, 115.0, 95.0, 110.0, 50.0);
        assert!((c.body() - 10.0).abs() < 1e-9);
        assert!((c.total_range() - 20.0).abs() < 1e-9);
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
    }

    #[test]
    fn strong_bullish_needs_seventy_percent_body() {
        assert!(candle(100.0, 111.0, 99.0, 110.0, 1.0).is_strong_bullish());
        assert!(!candle(100.0, 115.0, 95.0, 110.0, 1.0).is_strong_bullish());
        assert!(!candle(110.0, 111.0, 99.0, 100.0, 1.0).is_strong_bullish());
        // Doji with zero range
        assert!(!candle(100.0, 100.0, 100.0, 100.0, 1.0).is_strong_bullish());
    }

    #[test]
    fn touch_band_is_inclusive() {
        let c = candle(100.0, 105.0, 99.0, 104.0, 1.0);
        assert!(c.touches(99.0, 0.0));
        assert!(c.touches(105.0, 0.0));
        assert!(c.touches(98.99, 0.02));
        assert!(!c.touches(98.0, 0.5));
        assert!(!c.touches(106.0, 0.5));
    }

    #[test]
    fn bearish_engulfing_on_last_two() {
        let s = make_candles(&[(100.0, 106.0, 99.0, 105.0), (106.0, 107.0, 98.0, 99.0)]);
        assert!(s.ends_with_bearish_engulfing());

        let s = make_candles(&[(100.0, 106.0, 99.0, 105.0), (104.0, 105.0, 101.0, 102.0)]);
        assert!(!s.ends_with_bearish_engulfing());

        let single = make_candles(&[(100.0, 106.0, 99.0, 105.0)]);
        assert!(!single.ends_with_bearish_engulfing());
    }

    #[test]
    fn volume_ratio_excludes_last_candle() {
        let mut s = CandleSeries::default();
        for _ in 0..20 {
            s.push(candle(100.0, 101.0, 99.0, 100.5, 100.0));
        }
        s.push(candle(100.0, 103.0, 99.5, 102.5, 300.0));
        let ratio = s.volume_ratio(20).unwrap();
        assert!((ratio - 3.0).abs() < 1e-9);
    }

    #[test]
    fn volume_ratio_none_without_history() {
        let s = make_candles(&[(100.0, 101.0, 99.0, 100.5)]);
        assert!(s.volume_ratio(20).is_none());

        let mut zero = CandleSeries::default();
        zero.push(candle(100.0, 101.0, 99.0, 100.5, 0.0));
        zero.push(candle(100.0, 101.0, 99.0, 100.5, 10.0));
        assert!(zero.volume_ratio(20).is_none());
    }

    #[test]
    fn decodes_json_array() {
        let raw = r#"[
            {"timestamp":"2024-01-15T00:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":10.0},
            {"timestamp":"2024-01-16T00:00:00Z","open":1.5,"high":2.5,"low":1.0,"close":2.0}
        ]"#;
        let s = CandleSeries::from_json(raw).unwrap();
        assert_eq!(s.len(), 2);
        assert!((s[1].volume - 0.0).abs() < 1e-9);
        assert!((s.previous().unwrap().close - 1.5).abs() < 1e-9);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CandleSeries::from_json(r#"[{"open":"x"}]"#).is_err());
    }
}
