//! Deterministic backtesting core: position state machine, performance
//! metrics, and the walk-forward orchestrator.

pub mod metrics;
pub mod orchestrator;
pub mod position;

pub use metrics::TRADES_PER_YEAR;
pub use orchestrator::{BacktestRequest, BacktestResult, Backtester, MIN_WARMUP_BARS};
pub use position::PositionBook;
