use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use position_advisor::config::Config;
use position_advisor::core::trade_plan::PriceBucket;
use position_advisor::models::{CandleSeries, IndicatorSnapshot, StockAnalysis, StockPosition, Timeframe};
use position_advisor::strategies::{monitor_position, plan_trade};

/// One timeframe as delivered by the data provider.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    interval: String,
    indicators: Map<String, Value>,
    #[serde(default)]
    candles: CandleSeries,
}

#[derive(Debug, Deserialize)]
struct Request {
    analyses: Vec<RawAnalysis>,
    #[serde(default)]
    position: Option<StockPosition>,
    #[serde(default)]
    buckets: Vec<PriceBucket>,
}

fn decode(raw: Vec<RawAnalysis>) -> Result<Vec<StockAnalysis>> {
    let mut analyses = Vec::with_capacity(raw.len());
    for r in raw {
        let Some(timeframe) = Timeframe::from_str_loose(&r.interval) else {
            warn!("Unknown interval {:?}, skipping", r.interval);
            continue;
        };
        let indicators = IndicatorSnapshot::from_fields(&r.indicators)
            .with_context(|| format!("decoding {} indicators", r.interval))?;
        analyses.push(StockAnalysis::new(timeframe, indicators, r.candles));
    }
    Ok(analyses)
}

fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: position-advisor <request.json> [min_score]");
    };
    let requested: f64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid min_score {:?}", raw))?,
        None => 0.0,
    };
    let min_score = cfg.effective_min_score(requested);

    let body = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let request: Request = serde_json::from_str(&body).context("parsing request")?;
    let analyses = decode(request.analyses)?;

    let output = match request.position {
        Some(mut position) => {
            let eval = monitor_position(&cfg, &position, &analyses)?;
            position.apply_trailing(&eval.trailing);
            json!({ "analysis": eval.analysis, "position": position })
        }
        None => {
            let result = plan_trade(&cfg, &analyses, &request.buckets)?;
            let passes = result.passes_min_score(min_score);
            info!("Score {:.1} vs minimum {:.1}: {}", result.score, min_score, passes);
            json!({ "plan": result, "passes_min_score": passes })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
