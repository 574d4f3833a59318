use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use common::{
    round_to, BacktestMetrics, BacktestStatus, ClosedTrade, EquityCurvePoint, PricePoint,
    Result, SentimentSample,
};
use indicators::{moving_average, Rsi};
use sentiment::SentimentIndex;
use strategy::{evaluate_signal, StrategyParams};

use crate::metrics;
use crate::position::PositionBook;

/// Minimum number of price bars before any signal can be generated:
/// MA(50) needs 50 closes, which also covers RSI and MACD warm-up.
pub const MIN_WARMUP_BARS: usize = 50;

/// Rolling indicator window: enough history for MA(200) plus RSI/MACD
/// warm-up, matching what the live signal path feeds its indicators.
const INDICATOR_WINDOW: usize = 250;

/// Equity curve sampling cadence in bars (~1h of 5-minute bars).
const EQUITY_SAMPLE_INTERVAL: usize = 12;

/// Everything one backtest run consumes. Data loading is the caller's
/// responsibility: prices must arrive sorted ascending and deduplicated
/// by timestamp, sentiment samples likewise.
#[derive(Debug, Clone)]
pub struct BacktestRequest<'a> {
    /// Trading pair, e.g. "BTC/USDT".
    pub symbol: &'a str,
    /// Requested period bounds (echoed into the result; the price series
    /// is assumed to already be filtered to this window).
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub prices: &'a [PricePoint],
    pub sentiments: &'a [SentimentSample],
    pub params: StrategyParams,
}

/// Complete outcome of one backtest run. Produced once, owned by the
/// caller; the engine retains no state between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub status: BacktestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub symbol: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub data_points: usize,
    pub parameters: StrategyParams,
    pub trades: Vec<ClosedTrade>,
    pub metrics: BacktestMetrics,
    pub equity_curve: Vec<EquityCurvePoint>,
}

/// Deterministic walk-forward simulation over a materialized price
/// series.
///
/// One run is one sequential pass: for each bar past warm-up, compute
/// indicators from past closes only, look up the bar's hourly sentiment,
/// evaluate the signal, feed it through the position book, and sample
/// the equity curve. Two runs over identical inputs produce identical
/// results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtester;

impl Backtester {
    pub fn new() -> Self {
        Self
    }

    /// Run one backtest.
    ///
    /// `Err` is returned only for invalid parameters. Too little price
    /// data is a normal terminal outcome: an `Ok` result with
    /// `status: Error` and a descriptive `error_reason`.
    pub fn run(&self, request: &BacktestRequest<'_>) -> Result<BacktestResult> {
        request.params.validate()?;
        let params = request.params.clone();

        if request.prices.len() < MIN_WARMUP_BARS {
            let reason = format!(
                "Insufficient data: {} price records (need >= {MIN_WARMUP_BARS})",
                request.prices.len()
            );
            warn!(symbol = request.symbol, %reason, "Backtest aborted");
            return Ok(BacktestResult {
                status: BacktestStatus::Error,
                error_reason: Some(reason),
                symbol: request.symbol.to_string(),
                period_start: request.period_start,
                period_end: request.period_end,
                data_points: request.prices.len(),
                metrics: metrics::calculate(&[], params.initial_balance),
                parameters: params,
                trades: Vec::new(),
                equity_curve: Vec::new(),
            });
        }

        let sentiment_index = SentimentIndex::build(request.sentiments);
        info!(
            symbol = request.symbol,
            prices = request.prices.len(),
            sentiment_samples = sentiment_index.len(),
            start = %request.period_start,
            end = %request.period_end,
            "Backtest data loaded"
        );

        let closes: Vec<f64> = request.prices.iter().map(|p| p.close).collect();
        let rsi_indicator = Rsi::new(14);

        let mut book = PositionBook::new();
        let mut trades: Vec<ClosedTrade> = Vec::new();
        let mut equity_curve: Vec<EquityCurvePoint> = Vec::new();
        let initial_balance = params.initial_balance;
        let mut balance = initial_balance;

        for i in MIN_WARMUP_BARS..request.prices.len() {
            let bar = &request.prices[i];
            let price = bar.close;

            // Indicators see only closes at or before this bar
            let window = &closes[i.saturating_sub(INDICATOR_WINDOW)..=i];
            let rsi = rsi_indicator.compute(window);
            let ma50 = moving_average(window, 50);

            let sentiment = sentiment_index.average_at(bar.timestamp);

            let evaluation = evaluate_signal(rsi, sentiment, price, ma50, &params);

            let closed = book.apply(
                bar.timestamp,
                price,
                evaluation.action,
                rsi,
                sentiment,
                &params,
            );

            if let Some(trade) = closed {
                balance += trade.pnl;
                debug!(
                    ts = %bar.timestamp,
                    reason = %trade.exit_reason,
                    pnl = trade.pnl,
                    balance,
                    "Trade closed"
                );
                trades.push(trade);
                equity_curve.push(EquityCurvePoint {
                    timestamp: bar.timestamp,
                    balance: round_to(balance, 2),
                });
            } else if i % EQUITY_SAMPLE_INTERVAL == 0 {
                let unrealized = book.unrealized_pnl(price);
                equity_curve.push(EquityCurvePoint {
                    timestamp: bar.timestamp,
                    balance: round_to(balance + unrealized, 2),
                });
            }
        }

        // Force-close anything still open at the last available price
        if let Some(last) = request.prices.last() {
            if let Some(trade) = book.force_close(last.close, last.timestamp) {
                balance += trade.pnl;
                debug!(pnl = trade.pnl, "Open position force-closed at period end");
                trades.push(trade);
            }
            equity_curve.push(EquityCurvePoint {
                timestamp: last.timestamp,
                balance: round_to(balance, 2),
            });
        }

        let metrics = metrics::calculate(&trades, initial_balance);

        info!(
            symbol = request.symbol,
            trades = metrics.total_trades,
            total_pnl = metrics.total_pnl,
            win_rate = metrics.win_rate,
            max_drawdown = metrics.max_drawdown,
            sharpe = ?metrics.sharpe_ratio,
            "Backtest complete"
        );

        Ok(BacktestResult {
            status: BacktestStatus::Completed,
            error_reason: None,
            symbol: request.symbol.to_string(),
            period_start: request.period_start,
            period_end: request.period_end,
            data_points: request.prices.len(),
            parameters: params,
            trades,
            metrics,
            equity_curve,
        })
    }
}
