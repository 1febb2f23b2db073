use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{CandleSeries, IndicatorSnapshot, Timeframe};

/// Indicator snapshot plus candle history for one timeframe of one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub timeframe: Timeframe,
    pub indicators: IndicatorSnapshot,
    #[serde(default)]
    pub candles: CandleSeries,
}

impl StockAnalysis {
    pub fn new(timeframe: Timeframe, indicators: IndicatorSnapshot, candles: CandleSeries) -> Self {
        Self {
            timeframe,
            indicators,
            candles,
        }
    }

    /// Build from raw provider payloads.
    pub fn from_json(interval: &str, indicators: &str, candles: &str) -> Result<Self> {
        let timeframe =
            Timeframe::from_str_loose(interval).ok_or_else(|| EngineError::MalformedPayload {
                field: "interval".to_string(),
                reason: format!("unknown interval {:?}", interval),
            })?;
        Ok(Self::new(
            timeframe,
            IndicatorSnapshot::from_json(indicators)?,
            CandleSeries::from_json(candles)?,
        ))
    }

    /// Latest close: the last candle when present, else the snapshot close.
    pub fn last_price(&self) -> Option<f64> {
        self.candles
            .last()
            .map(|c| c.close)
            .filter(|p| *p > 0.0)
            .or(Some(self.indicators.close).filter(|p| *p > 0.0))
    }
}

/// Find the analysis for `timeframe`.
pub fn find_analysis(analyses: &[StockAnalysis], timeframe: Timeframe) -> Option<&StockAnalysis> {
    analyses.iter().find(|a| a.timeframe == timeframe)
}
