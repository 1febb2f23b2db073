pub mod monitor;
pub mod planner;

pub use monitor::{monitor_position, IndicatorSummary, PositionAnalysis, PositionEvaluation};
pub use planner::{plan_trade, PlanStatus, TradePlanResult};
