pub mod levels;
pub mod scoring;
pub mod signal;
pub mod trade_plan;
pub mod trailing;
