use serde::{Deserialize, Serialize};

use crate::models::{CandleSeries, LevelType, PivotLevels, PivotMethod, StockAnalysis, Timeframe};

/// Touch band half-width as a fraction of the level price (0.005%).
pub const TOUCH_TOLERANCE: f64 = 0.00005;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub price: f64,
    pub timeframe: Timeframe,
    pub touches: usize,
    pub level_type: LevelType,
    /// Pivot family and sub-level, e.g. "Camarilla S2".
    pub source: String,
}

impl Level {
    pub fn label(&self) -> String {
        format!("{} {} @ {:.2} ({} touches)", self.timeframe, self.source, self.price, self.touches)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<Level>,
    pub resistance: Vec<Level>,
}

impl LevelSet {
    pub fn extend(&mut self, other: LevelSet) {
        self.support.extend(other.support);
        self.resistance.extend(other.resistance);
    }

    /// Support strictly below `price` that is closest to it.
    pub fn nearest_support_below(&self, price: f64) -> Option<&Level> {
        self.support
            .iter()
            .filter(|l| l.price > 0.0 && l.price < price)
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Resistance strictly above `price` that is closest to it.
    pub fn nearest_resistance_above(&self, price: f64) -> Option<&Level> {
        self.resistance
            .iter()
            .filter(|l| l.price > price)
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    S1,
    S2,
    S3,
    R1,
    R2,
    R3,
}

impl Slot {
    fn pick(self, levels: &PivotLevels) -> f64 {
        match self {
            Slot::S1 => levels.s1,
            Slot::S2 => levels.s2,
            Slot::S3 => levels.s3,
            Slot::R1 => levels.r1,
            Slot::R2 => levels.r2,
            Slot::R3 => levels.r3,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Slot::S1 => "S1",
            Slot::S2 => "S2",
            Slot::S3 => "S3",
            Slot::R1 => "R1",
            Slot::R2 => "R2",
            Slot::R3 => "R3",
        }
    }
}

// Demark publishes a single level per side.
const SUPPORT_LEVELS: [(PivotMethod, Slot); 13] = [
    (PivotMethod::Classic, Slot::S1),
    (PivotMethod::Classic, Slot::S2),
    (PivotMethod::Classic, Slot::S3),
    (PivotMethod::Camarilla, Slot::S1),
    (PivotMethod::Camarilla, Slot::S2),
    (PivotMethod::Camarilla, Slot::S3),
    (PivotMethod::Demark, Slot::S1),
    (PivotMethod::Fibonacci, Slot::S1),
    (PivotMethod::Fibonacci, Slot::S2),
    (PivotMethod::Fibonacci, Slot::S3),
    (PivotMethod::Woodie, Slot::S1),
    (PivotMethod::Woodie, Slot::S2),
    (PivotMethod::Woodie, Slot::S3),
];

const RESISTANCE_LEVELS: [(PivotMethod, Slot); 13] = [
    (PivotMethod::Classic, Slot::R1),
    (PivotMethod::Classic, Slot::R2),
    (PivotMethod::Classic, Slot::R3),
    (PivotMethod::Camarilla, Slot::R1),
    (PivotMethod::Camarilla, Slot::R2),
    (PivotMethod::Camarilla, Slot::R3),
    (PivotMethod::Demark, Slot::R1),
    (PivotMethod::Fibonacci, Slot::R1),
    (PivotMethod::Fibonacci, Slot::R2),
    (PivotMethod::Fibonacci, Slot::R3),
    (PivotMethod::Woodie, Slot::R1),
    (PivotMethod::Woodie, Slot::R2),
    (PivotMethod::Woodie, Slot::R3),
];

/// Touch-counted support and resistance candidates for one timeframe.
pub fn extract_levels(analysis: &StockAnalysis) -> LevelSet {
    let pivots = &analysis.indicators.pivots;
    let build = |table: &[(PivotMethod, Slot)], level_type: LevelType| -> Vec<Level> {
        table
            .iter()
            .map(|&(method, slot)| {
                let price = slot.pick(pivots.get(method));
                Level {
                    price,
                    timeframe: analysis.timeframe,
                    touches: count_touches(price, &analysis.candles),
                    level_type,
                    source: format!("{} {}", method, slot.as_str()),
                }
            })
            .collect()
    };

    LevelSet {
        support: build(&SUPPORT_LEVELS, LevelType::Support),
        resistance: build(&RESISTANCE_LEVELS, LevelType::Resistance),
    }
}

/// Pooled levels across every supplied timeframe.
pub fn extract_all_levels(analyses: &[StockAnalysis]) -> LevelSet {
    let mut set = LevelSet::default();
    for analysis in analyses {
        set.extend(extract_levels(analysis));
    }
    set
}

/// Candles whose range reaches within 0.005% of `level`.
pub fn count_touches(level: f64, candles: &CandleSeries) -> usize {
    if level <= 0.0 {
        return 0;
    }
    candles.count_touches(level, level * TOUCH_TOLERANCE)
}
