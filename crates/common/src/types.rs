use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar of historical price data.
///
/// Series handed to the engine must already be sorted ascending by
/// timestamp with no duplicate timestamps per symbol; the engine never
/// re-sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A single sentiment reading for a base asset (e.g. "BTC").
/// Scores are normalized to [-1, 1] by the upstream collectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub source: String,
}

/// Trading action produced by signal evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Why a simulated position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SellSignal,
    /// Position was still open when the simulated period ran out and was
    /// force-closed at the last available price.
    PeriodEnd,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::SellSignal => write!(f, "sell_signal"),
            ExitReason::PeriodEnd => write!(f, "period_end"),
        }
    }
}

/// The single position a simulation may hold at any instant.
///
/// Created by a BUY transition, destroyed by whichever close transition
/// fires first. Indicator context at entry is carried along so the closed
/// trade can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub quantity: f64,
    pub entry_rsi: Option<f64>,
    pub entry_sentiment: Option<f64>,
}

/// A completed round trip. Immutable once created; the trade list of a
/// backtest is append-only in chronological close order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_time: DateTime<Utc>,
    pub quantity: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub exit_reason: ExitReason,
    /// RSI at entry, if it was available on the entry bar.
    pub rsi: Option<f64>,
    /// Sentiment at entry, if the entry bar's hour had any samples.
    pub sentiment: Option<f64>,
}

/// One sample of account balance over the simulated period.
/// Balance = initial balance + realized P&L, plus unrealized P&L of an
/// open position when sampled mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub timestamp: DateTime<Utc>,
    pub balance: f64,
}

/// Terminal status of a backtest run. An `Error` run is a normal,
/// fully-formed result with an `error_reason`, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BacktestStatus {
    Completed,
    Error,
}

impl std::fmt::Display for BacktestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BacktestStatus::Completed => write!(f, "completed"),
            BacktestStatus::Error => write!(f, "error"),
        }
    }
}

/// Aggregate performance statistics over a backtest's closed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage of trades with pnl > 0.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// Gross profit / gross loss. `None` when there are no losses.
    pub profit_factor: Option<f64>,
    /// Largest peak-to-trough decline of cumulative P&L, in currency units.
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    /// Annualized Sharpe ratio over per-trade P&L. `None` with fewer than
    /// two trades or zero P&L variance.
    pub sharpe_ratio: Option<f64>,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub avg_hold_duration_hours: Option<f64>,
    pub final_balance: f64,
}
