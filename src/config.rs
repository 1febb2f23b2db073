use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{StockAnalysis, Timeframe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeWeight {
    pub timeframe: Timeframe,
    pub weight: i32,
}

impl TimeframeWeight {
    pub fn new(timeframe: Timeframe, weight: i32) -> Self {
        Self { timeframe, weight }
    }
}

const DEFAULT_WEIGHTS: &str = "30m:1,1h:1,4h:2,1d:3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Signal aggregation, ordered as configured
    pub timeframe_weights: Vec<TimeframeWeight>,

    // Trade planning
    pub min_touches: usize,
    pub max_risk_pct: f64,
    pub min_risk_reward: f64,

    // Screening
    pub min_score: f64,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let mut timeframe_weights = parse_weights(&env("TIMEFRAME_WEIGHTS", DEFAULT_WEIGHTS));
        if timeframe_weights.is_empty() {
            warn!("TIMEFRAME_WEIGHTS has no usable entries, using {}", DEFAULT_WEIGHTS);
            timeframe_weights = parse_weights(DEFAULT_WEIGHTS);
        }

        Config {
            timeframe_weights,
            min_touches: env("MIN_TOUCHES", "1").parse().unwrap_or(1),
            max_risk_pct: env("MAX_RISK_PCT", "0.05").parse().unwrap_or(0.05), // 5% of entry
            min_risk_reward: env("MIN_RISK_REWARD", "1.0").parse().unwrap_or(1.0),
            min_score: env("MIN_SCORE", "60").parse().unwrap_or(60.0),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    /// Defaults for everything except the weight ladder.
    pub fn with_weights(timeframe_weights: Vec<TimeframeWeight>) -> Self {
        Config {
            timeframe_weights,
            min_touches: 1,
            max_risk_pct: 0.05,
            min_risk_reward: 1.0,
            min_score: 60.0,
            log_level: "INFO".to_string(),
        }
    }

    pub fn weight_of(&self, timeframe: Timeframe) -> Option<i32> {
        self.timeframe_weights
            .iter()
            .find(|w| w.timeframe == timeframe)
            .map(|w| w.weight)
    }

    /// The timeframe carrying the highest weight; the first one wins ties.
    pub fn main_trend(&self) -> Option<Timeframe> {
        let mut best: Option<&TimeframeWeight> = None;
        for w in &self.timeframe_weights {
            if best.map_or(true, |b| w.weight > b.weight) {
                best = Some(w);
            }
        }
        best.map(|w| w.timeframe)
    }

    /// The next-highest weighted timeframe after the main one that is present in `analyses`.
    pub fn secondary_trend(&self, analyses: &[StockAnalysis]) -> Option<Timeframe> {
        let main = self.main_trend()?;
        let mut best: Option<&TimeframeWeight> = None;
        for w in &self.timeframe_weights {
            if w.timeframe == main || !analyses.iter().any(|a| a.timeframe == w.timeframe) {
                continue;
            }
            if best.map_or(true, |b| w.weight > b.weight) {
                best = Some(w);
            }
        }
        best.map(|w| w.timeframe)
    }

    /// A requested minimum score of zero means "use the configured default".
    pub fn effective_min_score(&self, requested: f64) -> f64 {
        if requested == 0.0 {
            self.min_score
        } else {
            requested
        }
    }
}

/// Parse `30m:1,4h:2,1d:3`. Bad entries are skipped with a warning.
pub fn parse_weights(raw: &str) -> Vec<TimeframeWeight> {
    let mut weights: Vec<TimeframeWeight> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parsed = entry.split_once(':').and_then(|(tf, w)| {
            let timeframe = Timeframe::from_str_loose(tf)?;
            let weight = w.trim().parse::<i32>().ok()?;
            Some(TimeframeWeight::new(timeframe, weight))
        });
        match parsed {
            Some(w) if weights.iter().any(|x| x.timeframe == w.timeframe) => {
                warn!("Duplicate timeframe weight {:?} ignored", entry);
            }
            Some(w) => weights.push(w),
            None => warn!("Unparseable timeframe weight {:?} ignored", entry),
        }
    }
    weights
}
