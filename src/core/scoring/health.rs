use super::{clamp_score, FactorScore, Insight, ScoreInput};
use crate::core::levels::LevelSet;

const PNL_WEIGHT: f64 = 0.5;
const REWARD_WEIGHT: f64 = 0.25;
const STOP_WEIGHT: f64 = 0.25;

/// Risk is the planned entry-to-stop range; the buffer is measured from the stop in force.
pub fn score(input: &ScoreInput) -> FactorScore {
    let mut insights = Vec::new();
    let pnl = pnl_part(input, &mut insights);
    let reward = reward_part(input, &mut insights);
    let stop = stop_part(input.levels, input.planned_stop_loss, input.last_price, &mut insights);
    FactorScore::new(
        pnl * PNL_WEIGHT + reward * REWARD_WEIGHT + stop * STOP_WEIGHT,
        insights,
    )
}

fn pnl_part(input: &ScoreInput, insights: &mut Vec<Insight>) -> f64 {
    let (last, entry, sl) = (input.last_price, input.entry_price, input.stop_loss);
    if entry <= 0.0 {
        return 50.0;
    }
    let pct = (last - entry) / entry * 100.0;
    let mut score = if pct >= 0.0 { 50.0 + 2.0 * pct } else { 50.0 + 5.0 * pct };

    let risk = entry - input.planned_stop_loss;
    if risk > 0.0 {
        let ratio = (last - sl) / risk;
        if ratio < 0.25 {
            score -= 50.0;
            insights.push(Insight::new(
                format!("Price {:.2} is close to the stop loss {:.2}", last, sl),
                95,
            ));
        } else if ratio < 0.5 {
            score -= 25.0;
            insights.push(Insight::new("Price is drifting toward the stop loss", 70));
        } else {
            score += 20.0;
        }
    }
    if pct >= 5.0 {
        insights.push(Insight::new(format!("Position is up {:.1}%", pct), 45));
    }
    clamp_score(score)
}

fn reward_part(input: &ScoreInput, insights: &mut Vec<Insight>) -> f64 {
    let (entry, sl, tp) = (input.entry_price, input.planned_stop_loss, input.take_profit);
    let risk = entry - sl;
    let rr = if risk > 0.0 && tp > entry { (tp - entry) / risk } else { 0.0 };
    let tier = if rr >= 2.0 {
        100.0
    } else if rr >= 1.5 {
        70.0
    } else {
        40.0
    };

    let realism = match input.levels.nearest_resistance_above(input.last_price) {
        None => 70.0,
        Some(res) if tp <= res.price => 80.0 + (res.touches as f64 * 5.0).min(20.0),
        Some(res) => {
            insights.push(Insight::new(
                format!("Take profit {:.2} sits beyond resistance {}", tp, res.label()),
                60,
            ));
            50.0 - (res.touches as f64 * 10.0).min(40.0)
        }
    };
    clamp_score(tier * 0.4 + realism * 0.6)
}

fn stop_part(levels: &LevelSet, sl: f64, last: f64, insights: &mut Vec<Insight>) -> f64 {
    let Some(support) = levels.nearest_support_below(last) else {
        return 50.0;
    };
    let score = if sl < support.price {
        let gap = (support.price - sl) / support.price;
        let proximity = if gap <= 0.02 {
            20.0
        } else if gap <= 0.05 {
            10.0
        } else {
            0.0
        };
        50.0 + (support.touches as f64 * 10.0).min(30.0) + proximity
    } else {
        insights.push(Insight::new(
            format!("Stop loss {:.2} is not protected by support {}", sl, support.label()),
            55,
        ));
        30.0 - (support.touches as f64 * 10.0).min(30.0)
    };
    clamp_score(score)
}
