use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::core::levels::{Level, LevelSet};
use crate::models::{StockAnalysis, Timeframe};

/// EMA stops sit this fraction below the average.
const EMA_STOP_OFFSET: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaContext {
    pub timeframe: Timeframe,
    pub ema10: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub is_main: bool,
}

impl EmaContext {
    pub fn from_analyses(analyses: &[StockAnalysis], main: Timeframe) -> Vec<EmaContext> {
        analyses
            .iter()
            .map(|a| {
                let ma = &a.indicators.moving_averages;
                EmaContext {
                    timeframe: a.timeframe,
                    ema10: ma.ema10,
                    ema20: ma.ema20,
                    ema50: ma.ema50,
                    is_main: a.timeframe == main,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub price: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub price: f64,
    pub kind: String,
    pub reason: String,
}

impl Candidate {
    fn new(price: f64, kind: &str, reason: String) -> Self {
        Self {
            price,
            kind: kind.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk: f64,
    pub reward: f64,
    pub risk_reward: f64,
    pub sl_type: String,
    pub sl_reason: String,
    pub tp_type: String,
    pub tp_reason: String,
}

impl TradePlan {
    pub fn is_empty(&self) -> bool {
        self.entry == 0.0
    }
}

pub struct TradePlanCalculator {
    pub min_touches: usize,
    pub max_risk_pct: f64,
    pub min_risk_reward: f64,
}

impl TradePlanCalculator {
    pub fn new() -> Self {
        Self {
            min_touches: 1,
            max_risk_pct: 0.05,
            min_risk_reward: 1.0,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            min_touches: cfg.min_touches,
            max_risk_pct: cfg.max_risk_pct,
            min_risk_reward: cfg.min_risk_reward,
        }
    }

    /// First valid (stop, target) pair in generation order, or an empty plan.
    pub fn calculate(
        &self,
        price: f64,
        levels: &LevelSet,
        emas: &[EmaContext],
        buckets: &[PriceBucket],
    ) -> TradePlan {
        let stops = self.stop_loss_candidates(price, levels, emas, buckets);
        if stops.is_empty() {
            debug!("No support below {:.2}, no plan", price);
            return TradePlan::default();
        }
        let targets = self.take_profit_candidates(price, levels, buckets);

        for sl in &stops {
            let risk = price - sl.price;
            if risk <= 0.0 || risk / price > self.max_risk_pct {
                continue;
            }
            for tp in &targets {
                let reward = tp.price - price;
                if reward <= 0.0 {
                    continue;
                }
                let risk_reward = reward / risk;
                if risk_reward >= self.min_risk_reward {
                    debug!(
                        "Plan @ {:.2}: SL {:.2} [{}] TP {:.2} [{}] R:R {:.2}",
                        price, sl.price, sl.kind, tp.price, tp.kind, risk_reward
                    );
                    return TradePlan {
                        entry: price,
                        stop_loss: sl.price,
                        take_profit: tp.price,
                        risk,
                        reward,
                        risk_reward,
                        sl_type: sl.kind.clone(),
                        sl_reason: sl.reason.clone(),
                        tp_type: tp.kind.clone(),
                        tp_reason: tp.reason.clone(),
                    };
                }
            }
        }

        debug!("No stop/target pair at {:.2} clears R:R {:.1}", price, self.min_risk_reward);
        TradePlan::default()
    }

    pub fn stop_loss_candidates(
        &self,
        price: f64,
        levels: &LevelSet,
        emas: &[EmaContext],
        buckets: &[PriceBucket],
    ) -> Vec<Candidate> {
        let Some(best) = self.best_support(price, &levels.support) else {
            return Vec::new();
        };

        let mut out = vec![Candidate::new(
            best.price,
            "support",
            format!("Most-touched support {}", best.label()),
        )];

        let tighter = levels
            .support
            .iter()
            .filter(|l| l.price > best.price && l.price < price)
            .max_by(|a, b| a.price.total_cmp(&b.price));
        if let Some(t) = tighter {
            out.push(Candidate::new(
                t.price,
                "tight_support",
                format!("Nearest support above best {}", t.label()),
            ));
        }

        if let Some(main) = emas.iter().find(|e| e.is_main) {
            if main.ema20 > 0.0 {
                out.push(Candidate::new(
                    main.ema20 * (1.0 - EMA_STOP_OFFSET),
                    "ema20",
                    format!("0.5% below {} EMA20 {:.2}", main.timeframe, main.ema20),
                ));
            }
            if main.ema50 > 0.0 {
                out.push(Candidate::new(
                    main.ema50 * (1.0 - EMA_STOP_OFFSET),
                    "ema50",
                    format!("0.5% below {} EMA50 {:.2}", main.timeframe, main.ema50),
                ));
            }
        }

        for b in buckets.iter().filter(|b| b.price > best.price && b.price < price) {
            out.push(Candidate::new(
                b.price,
                "consolidation",
                format!("Consolidation zone {:.2} ({} closes)", b.price, b.count),
            ));
        }

        out
    }

    pub fn take_profit_candidates(
        &self,
        price: f64,
        levels: &LevelSet,
        buckets: &[PriceBucket],
    ) -> Vec<Candidate> {
        let mut out = Vec::new();

        let primary = levels
            .resistance
            .iter()
            .filter(|l| l.price > price)
            .max_by(|a, b| a.touches.cmp(&b.touches).then(b.price.total_cmp(&a.price)));
        if let Some(r) = primary {
            out.push(Candidate::new(
                r.price,
                "resistance",
                format!("Most-touched resistance {}", r.label()),
            ));
        }

        let busiest = buckets
            .iter()
            .filter(|b| b.price > price)
            .max_by(|a, b| a.count.cmp(&b.count).then(b.price.total_cmp(&a.price)));
        if let Some(b) = busiest {
            out.push(Candidate::new(
                b.price,
                "consolidation",
                format!("Busiest zone above {:.2} ({} closes)", b.price, b.count),
            ));
        }

        if let Some(r) = primary {
            let mut higher: Vec<f64> = levels
                .resistance
                .iter()
                .map(|l| l.price)
                .filter(|p| *p > r.price)
                .collect();
            higher.sort_by(|a, b| a.total_cmp(b));
            higher.dedup();
            match higher.as_slice() {
                [] => {}
                [only] => out.push(Candidate::new(
                    *only,
                    "next_resistance",
                    format!("Next resistance above {:.2}", r.price),
                )),
                [first, second, ..] => out.push(Candidate::new(
                    (first + second) / 2.0,
                    "resistance_midpoint",
                    format!("Midpoint of resistances {:.2} and {:.2}", first, second),
                )),
            }
        }

        out
    }

    fn best_support<'a>(&self, price: f64, support: &'a [Level]) -> Option<&'a Level> {
        support
            .iter()
            .filter(|l| l.price > 0.0 && l.price < price && l.touches >= self.min_touches)
            .max_by(|a, b| a.touches.cmp(&b.touches).then(a.price.total_cmp(&b.price)))
    }
}

impl Default for TradePlanCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LevelType;

    fn level(price: f64, touches: usize, level_type: LevelType) -> Level {
        Level {
            price,
            timeframe: Timeframe::D1,
            touches,
            level_type,
            source: "Classic".to_string(),
        }
    }

    fn support(price: f64, touches: usize) -> Level {
        level(price, touches, LevelType::Support)
    }

    fn resistance(price: f64, touches: usize) -> Level {
        level(price, touches, LevelType::Resistance)
    }

    #[test]
    fn accepts_first_pair_with_rr_three() {
        let levels = LevelSet {
            support: vec![support(95.0, 2)],
            resistance: vec![resistance(115.0, 3)],
        };
        let plan = TradePlanCalculator::new().calculate(100.0, &levels, &[], &[]);
        assert!(!plan.is_empty());
        assert_eq!(plan.stop_loss, 95.0);
        assert_eq!(plan.take_profit, 115.0);
        assert_eq!(plan.risk, 5.0);
        assert_eq!(plan.reward, 15.0);
        assert!((plan.risk_reward - 3.0).abs() < 1e-9);
        assert_eq!(plan.sl_type, "support");
        assert_eq!(plan.tp_type, "resistance");
    }

    #[test]
    fn low_rr_target_is_skipped_for_the_next_one() {
        // Primary target 102 gives R:R 0.4; midpoint of 110/120 gives 3.0
        let levels = LevelSet {
            support: vec![support(95.0, 2)],
            resistance: vec![resistance(102.0, 3), resistance(110.0, 0), resistance(120.0, 0)],
        };
        let plan = TradePlanCalculator::new().calculate(100.0, &levels, &[], &[]);
        assert_eq!(plan.take_profit, 115.0);
        assert_eq!(plan.tp_type, "resistance_midpoint");
        assert!((plan.risk_reward - 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_support_below_price_gives_empty_plan() {
        let levels = LevelSet {
            support: vec![support(105.0, 4)],
            resistance: vec![resistance(120.0, 2)],
        };
        let emas = [EmaContext {
            timeframe: Timeframe::D1,
            ema10: 99.0,
            ema20: 98.0,
            ema50: 96.0,
            is_main: true,
        }];
        let plan = TradePlanCalculator::new().calculate(100.0, &levels, &emas, &[]);
        assert!(plan.is_empty());
        assert_eq!(plan, TradePlan::default());
    }

    #[test]
    fn untouched_support_does_not_qualify() {
        let levels = LevelSet {
            support: vec![support(95.0, 0)],
            resistance: vec![resistance(120.0, 2)],
        };
        assert!(TradePlanCalculator::new()
            .calculate(100.0, &levels, &[], &[])
            .is_empty());
    }

    #[test]
    fn stop_beyond_max_risk_falls_through_to_tighter_candidate() {
        // Best-touch support at 90 is 10% away; tighter support at 97 is fine.
        let levels = LevelSet {
            support: vec![support(90.0, 5), support(97.0, 1)],
            resistance: vec![resistance(106.0, 2)],
        };
        let plan = TradePlanCalculator::new().calculate(100.0, &levels, &[], &[]);
        assert_eq!(plan.stop_loss, 97.0);
        assert_eq!(plan.sl_type, "tight_support");
        assert!((plan.risk_reward - 2.0).abs() < 1e-9);
    }

    #[test]
    fn stop_candidates_in_generation_order() {
        let levels = LevelSet {
            support: vec![support(94.0, 3), support(96.0, 1), support(90.0, 1)],
            resistance: vec![],
        };
        let emas = [
            EmaContext {
                timeframe: Timeframe::H4,
                ema10: 1.0,
                ema20: 1.0,
                ema50: 1.0,
                is_main: false,
            },
            EmaContext {
                timeframe: Timeframe::D1,
                ema10: 99.0,
                ema20: 98.0,
                ema50: 97.0,
                is_main: true,
            },
        ];
        let buckets = [
            PriceBucket { price: 95.0, count: 7 },
            PriceBucket { price: 92.0, count: 9 },
            PriceBucket { price: 101.0, count: 3 },
        ];
        let c = TradePlanCalculator::new().stop_loss_candidates(100.0, &levels, &emas, &buckets);
        let kinds: Vec<&str> = c.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["support", "tight_support", "ema20", "ema50", "consolidation"]);
        assert_eq!(c[0].price, 94.0);
        assert_eq!(c[1].price, 96.0);
        assert!((c[2].price - 97.51).abs() < 1e-9);
        assert!((c[3].price - 96.515).abs() < 1e-9);
        assert_eq!(c[4].price, 95.0);
    }

    #[test]
    fn touch_ties_prefer_nearest_support() {
        let levels = LevelSet {
            support: vec![support(92.0, 2), support(96.0, 2)],
            resistance: vec![],
        };
        let c = TradePlanCalculator::new().stop_loss_candidates(100.0, &levels, &[], &[]);
        assert_eq!(c[0].price, 96.0);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn target_candidates_in_generation_order() {
        let levels = LevelSet {
            support: vec![],
            resistance: vec![
                resistance(104.0, 1),
                resistance(108.0, 4),
                resistance(112.0, 0),
                resistance(112.0, 2),
                resistance(120.0, 0),
                resistance(98.0, 9),
            ],
        };
        let buckets = [
            PriceBucket { price: 103.0, count: 5 },
            PriceBucket { price: 109.0, count: 5 },
            PriceBucket { price: 99.0, count: 50 },
        ];
        let c = TradePlanCalculator::new().take_profit_candidates(100.0, &levels, &buckets);
        let kinds: Vec<&str> = c.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["resistance", "consolidation", "resistance_midpoint"]);
        assert_eq!(c[0].price, 108.0);
        assert_eq!(c[1].price, 103.0);
        assert_eq!(c[2].price, 116.0);
    }

    #[test]
    fn single_higher_resistance_is_used_directly() {
        let levels = LevelSet {
            support: vec![],
            resistance: vec![resistance(105.0, 3), resistance(111.0, 0)],
        };
        let c = TradePlanCalculator::new().take_profit_candidates(100.0, &levels, &[]);
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].price, 111.0);
        assert_eq!(c[1].kind, "next_resistance");
    }

    #[test]
    fn no_pair_clearing_rr_gives_empty_plan() {
        let levels = LevelSet {
            support: vec![support(96.0, 2)],
            resistance: vec![resistance(101.0, 2)],
        };
        assert!(TradePlanCalculator::new()
            .calculate(100.0, &levels, &[], &[])
            .is_empty());
    }
}
