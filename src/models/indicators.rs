use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::models::Recommendation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotMethod {
    Classic,
    Fibonacci,
    Camarilla,
    Woodie,
    Demark,
}

impl PivotMethod {
    pub const ALL: [PivotMethod; 5] = [
        PivotMethod::Classic,
        PivotMethod::Fibonacci,
        PivotMethod::Camarilla,
        PivotMethod::Woodie,
        PivotMethod::Demark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PivotMethod::Classic => "Classic",
            PivotMethod::Fibonacci => "Fibonacci",
            PivotMethod::Camarilla => "Camarilla",
            PivotMethod::Woodie => "Woodie",
            PivotMethod::Demark => "Demark",
        }
    }
}

impl fmt::Display for PivotMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pivot family's levels. Missing values stay at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub middle: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pivots {
    pub classic: PivotLevels,
    pub fibonacci: PivotLevels,
    pub camarilla: PivotLevels,
    pub woodie: PivotLevels,
    pub demark: PivotLevels,
}

impl Pivots {
    pub fn get(&self, method: PivotMethod) -> &PivotLevels {
        match method {
            PivotMethod::Classic => &self.classic,
            PivotMethod::Fibonacci => &self.fibonacci,
            PivotMethod::Camarilla => &self.camarilla,
            PivotMethod::Woodie => &self.woodie,
            PivotMethod::Demark => &self.demark,
        }
    }

    fn get_mut(&mut self, method: PivotMethod) -> &mut PivotLevels {
        match method {
            PivotMethod::Classic => &mut self.classic,
            PivotMethod::Fibonacci => &mut self.fibonacci,
            PivotMethod::Camarilla => &mut self.camarilla,
            PivotMethod::Woodie => &mut self.woodie,
            PivotMethod::Demark => &mut self.demark,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Oscillators {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub adx: f64,
    pub cci: f64,
    pub momentum: f64,
    pub williams_r: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ema10: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema100: f64,
    pub ema200: f64,
    pub sma10: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma100: f64,
    pub sma200: f64,
}

/// One timeframe's technical reading, decoded from a provider document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub summary: Recommendation,
    pub oscillators_rating: Recommendation,
    pub moving_averages_rating: Recommendation,
    pub oscillators: Oscillators,
    pub moving_averages: MovingAverages,
    pub pivots: Pivots,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl IndicatorSnapshot {
    /// Decode a provider JSON object (`{"RSI": 55.1, "Pivot.M.Classic.S1": ...}`).
    pub fn from_json(raw: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(fields) => Self::from_fields(&fields),
            other => Err(EngineError::MalformedPayload {
                field: "<root>".to_string(),
                reason: format!("expected object, got {}", value_kind(&other)),
            }),
        }
    }

    /// Field-by-field mapping from provider keys to the typed snapshot.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        let oscillators = Oscillators {
            rsi: number(fields, "RSI")?,
            macd: number(fields, "MACD.macd")?,
            macd_signal: number(fields, "MACD.signal")?,
            stoch_k: number(fields, "Stoch.K")?,
            stoch_d: number(fields, "Stoch.D")?,
            adx: number(fields, "ADX")?,
            cci: number(fields, "CCI20")?,
            momentum: number(fields, "Mom")?,
            williams_r: number(fields, "W.R")?,
        };

        let moving_averages = MovingAverages {
            ema10: number(fields, "EMA10")?,
            ema20: number(fields, "EMA20")?,
            ema50: number(fields, "EMA50")?,
            ema100: number(fields, "EMA100")?,
            ema200: number(fields, "EMA200")?,
            sma10: number(fields, "SMA10")?,
            sma20: number(fields, "SMA20")?,
            sma50: number(fields, "SMA50")?,
            sma100: number(fields, "SMA100")?,
            sma200: number(fields, "SMA200")?,
        };

        let mut pivots = Pivots::default();
        for method in PivotMethod::ALL {
            *pivots.get_mut(method) = pivot_levels(fields, method)?;
        }

        Ok(Self {
            summary: rating(fields, "Recommend.All")?,
            oscillators_rating: rating(fields, "Recommend.Other")?,
            moving_averages_rating: rating(fields, "Recommend.MA")?,
            oscillators,
            moving_averages,
            pivots,
            open: number(fields, "open")?,
            close: number(fields, "close")?,
            high: number(fields, "high")?,
            low: number(fields, "low")?,
            volume: number(fields, "volume")?,
        })
    }
}

fn pivot_levels(fields: &Map<String, Value>, method: PivotMethod) -> Result<PivotLevels> {
    let key = |level: &str| format!("Pivot.M.{}.{}", method.as_str(), level);
    Ok(PivotLevels {
        middle: number(fields, &key("Middle"))?,
        r1: number(fields, &key("R1"))?,
        r2: number(fields, &key("R2"))?,
        r3: number(fields, &key("R3"))?,
        s1: number(fields, &key("S1"))?,
        s2: number(fields, &key("S2"))?,
        s3: number(fields, &key("S3"))?,
    })
}

/// Missing or null keys decode to 0; numeric strings are accepted.
fn number(fields: &Map<String, Value>, key: &str) -> Result<f64> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| malformed(key, "number out of range")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(key, &format!("not a number: {:?}", s))),
        Some(other) => Err(malformed(key, &format!("expected number, got {}", value_kind(other)))),
    }
}

/// Ratings arrive either as the provider's [-1, 1] number or as a label.
fn rating(fields: &Map<String, Value>, key: &str) -> Result<Recommendation> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(Recommendation::Neutral),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Recommendation::from_rating)
            .ok_or_else(|| malformed(key, "number out of range")),
        Some(Value::String(s)) => Recommendation::from_label(s)
            .map(Ok)
            .unwrap_or_else(|| {
                s.trim()
                    .parse::<f64>()
                    .map(Recommendation::from_rating)
                    .map_err(|_| malformed(key, &format!("unknown rating {:?}", s)))
            }),
        Some(other) => Err(malformed(key, &format!("expected rating, got {}", value_kind(other)))),
    }
}

fn malformed(field: &str, reason: &str) -> EngineError {
    EngineError::MalformedPayload {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
