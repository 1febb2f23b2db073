pub mod analysis;
pub mod candle;
pub mod indicators;
pub mod position;
pub mod rating;
pub mod timeframe;

pub use analysis::{find_analysis, StockAnalysis};
pub use candle::{Candle, CandleSeries};
pub use indicators::{IndicatorSnapshot, MovingAverages, Oscillators, PivotLevels, PivotMethod, Pivots};
pub use position::{effective_stop, StockPosition, TrailingState};
pub use rating::*;
pub use timeframe::Timeframe;
