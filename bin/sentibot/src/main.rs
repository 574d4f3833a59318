use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use backtest::{BacktestRequest, Backtester};
use common::{PricePoint, SentimentSample};
use strategy::{StrategyFileConfig, StrategyParams};

/// Runner settings from environment variables (`.env` supported).
struct RunnerConfig {
    /// Path to the OHLCV price series CSV (required).
    prices_csv: String,
    /// Path to the sentiment series CSV (optional).
    sentiment_csv: Option<String>,
    /// Path to a strategy TOML; balanced defaults when absent.
    strategy_toml: Option<String>,
    /// Trading pair label for the result.
    symbol: String,
}

impl RunnerConfig {
    fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        RunnerConfig {
            prices_csv: required_env("PRICES_CSV"),
            sentiment_csv: optional_env("SENTIMENT_CSV"),
            strategy_toml: optional_env("STRATEGY_TOML"),
            symbol: optional_env("SYMBOL").unwrap_or_else(|| "BTC/USDT".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Load OHLCV bars from CSV (columns: timestamp,open,high,low,close,volume
/// with RFC 3339 timestamps), sorted ascending and deduplicated by
/// timestamp — the shape the engine expects.
fn load_prices(path: &str) -> Result<Vec<PricePoint>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening price CSV '{path}'"))?;
    let mut prices: Vec<PricePoint> = Vec::new();
    for record in reader.deserialize() {
        let point: PricePoint =
            record.with_context(|| format!("parsing price record in '{path}'"))?;
        prices.push(point);
    }
    prices.sort_by_key(|p| p.timestamp);
    prices.dedup_by_key(|p| p.timestamp);
    Ok(prices)
}

/// Load sentiment samples from CSV (columns: timestamp,score,source).
fn load_sentiments(path: &str) -> Result<Vec<SentimentSample>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening sentiment CSV '{path}'"))?;
    let mut samples: Vec<SentimentSample> = Vec::new();
    for record in reader.deserialize() {
        let sample: SentimentSample =
            record.with_context(|| format!("parsing sentiment record in '{path}'"))?;
        samples.push(sample);
    }
    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ───────────────────────────────────────────────────────────────
    let cfg = RunnerConfig::from_env();
    info!(symbol = %cfg.symbol, prices = %cfg.prices_csv, "Sentibot backtest runner starting");

    // ── Strategy parameters ──────────────────────────────────────────────────
    let params = match &cfg.strategy_toml {
        Some(path) => StrategyFileConfig::load(path)?.params(),
        None => {
            info!("No STRATEGY_TOML set — using balanced defaults");
            StrategyParams::default()
        }
    };

    // ── Data ─────────────────────────────────────────────────────────────────
    let prices = load_prices(&cfg.prices_csv)?;
    let sentiments = match &cfg.sentiment_csv {
        Some(path) => load_sentiments(path)?,
        None => Vec::new(),
    };
    info!(
        prices = prices.len(),
        sentiment_samples = sentiments.len(),
        "Series loaded"
    );

    let (period_start, period_end) = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp),
        _ => anyhow::bail!("price CSV '{}' contains no records", cfg.prices_csv),
    };

    // ── Run ──────────────────────────────────────────────────────────────────
    let request = BacktestRequest {
        symbol: &cfg.symbol,
        period_start,
        period_end,
        prices: &prices,
        sentiments: &sentiments,
        params,
    };
    let result = Backtester::new().run(&request)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
