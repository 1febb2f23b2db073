use super::{FactorScore, Insight};
use crate::models::{Recommendation, Timeframe};

pub fn score(main: Recommendation, secondary: Recommendation, secondary_tf: Timeframe) -> FactorScore {
    let mut insights = Vec::new();
    let value = if main.is_buy_family() && !secondary.is_sell_family() {
        100.0
    } else if main.is_sell_family() && secondary.is_sell_family() {
        insights.push(Insight::new(
            format!("Main and {} trends are both bearish", secondary_tf),
            85,
        ));
        0.0
    } else if (main.is_buy_family() && secondary.is_sell_family())
        || (main.is_sell_family() && secondary.is_buy_family())
    {
        insights.push(Insight::new(
            format!("{} trend ({}) conflicts with the main trend ({})", secondary_tf, secondary, main),
            65,
        ));
        20.0
    } else {
        50.0
    };
    FactorScore::new(value, insights)
}
