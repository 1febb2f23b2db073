use thiserror::Error;

use crate::models::Timeframe;

/// Failures that make an evaluation call impossible.
///
/// "No qualifying setup" is not an error; see `TradePlan::is_empty`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no analyses supplied")]
    NoAnalyses,

    #[error("no timeframe weights configured")]
    NoTimeframeWeights,

    #[error("main trend not found: no analysis for configured main timeframe {0}")]
    MainTrendNotFound(Timeframe),

    #[error("no usable last price for timeframe {0}")]
    MissingPrice(Timeframe),

    #[error("malformed payload field {field}: {reason}")]
    MalformedPayload { field: String, reason: String },

    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
