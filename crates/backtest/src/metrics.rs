use common::{round_to, BacktestMetrics, ClosedTrade};

/// Annualization constant for the Sharpe ratio: the source system trades
/// on 5-minute bars and averages ~3 round trips per day, so per-trade
/// returns are scaled by sqrt(1095 trades/year). A fixed modeling
/// assumption, preserved for result compatibility — not derived from the
/// actual trade cadence of a run.
pub const TRADES_PER_YEAR: f64 = 1095.0;

/// Aggregate a backtest's closed trades into performance metrics.
///
/// A winner is a trade with pnl > 0; zero-pnl trades count as losers, so
/// winning + losing always equals total. An empty trade list produces a
/// fully zeroed record with `final_balance = initial_balance`.
pub fn calculate(trades: &[ClosedTrade], initial_balance: f64) -> BacktestMetrics {
    if trades.is_empty() {
        return empty(initial_balance);
    }

    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    let wins: Vec<f64> = pnls.iter().copied().filter(|&p| p > 0.0).collect();
    let losses: Vec<f64> = pnls.iter().copied().filter(|&p| p <= 0.0).collect();

    let total_pnl: f64 = pnls.iter().sum();
    let total_pnl_percent = if initial_balance != 0.0 {
        total_pnl / initial_balance * 100.0
    } else {
        0.0
    };

    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        Some(round_to(gross_profit / gross_loss, 4))
    } else {
        None
    };

    let max_dd = max_drawdown(&pnls);
    let max_dd_pct = if initial_balance != 0.0 {
        max_dd / initial_balance * 100.0
    } else {
        0.0
    };

    let sharpe = sharpe_ratio(&pnls);

    // Hold durations, for trades where both timestamps are present by
    // construction; kept as a mean in hours
    let durations: Vec<f64> = trades
        .iter()
        .map(|t| (t.exit_time - t.entry_time).num_seconds() as f64 / 3600.0)
        .collect();
    let avg_hold = if durations.is_empty() {
        None
    } else {
        Some(round_to(
            durations.iter().sum::<f64>() / durations.len() as f64,
            2,
        ))
    };

    let best = pnls.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let worst = pnls.iter().cloned().fold(f64::INFINITY, f64::min);

    BacktestMetrics {
        total_trades: trades.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        win_rate: round_to(wins.len() as f64 / trades.len() as f64 * 100.0, 2),
        total_pnl: round_to(total_pnl, 2),
        total_pnl_percent: round_to(total_pnl_percent, 2),
        avg_win: if wins.is_empty() {
            0.0
        } else {
            round_to(gross_profit / wins.len() as f64, 2)
        },
        avg_loss: if losses.is_empty() {
            0.0
        } else {
            round_to(losses.iter().sum::<f64>() / losses.len() as f64, 2)
        },
        profit_factor,
        max_drawdown: round_to(max_dd, 2),
        max_drawdown_percent: round_to(max_dd_pct, 2),
        sharpe_ratio: sharpe,
        best_trade: round_to(best, 2),
        worst_trade: round_to(worst, 2),
        avg_hold_duration_hours: avg_hold,
        final_balance: round_to(initial_balance + total_pnl, 2),
    }
}

/// Walk cumulative P&L in close order tracking the running peak.
/// Never negative.
fn max_drawdown(pnls: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = 0.0;
    let mut max_dd = 0.0;
    for &pnl in pnls {
        cumulative += pnl;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = peak - cumulative;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Annualized Sharpe over per-trade P&L with sample (n−1) variance.
/// `None` with fewer than 2 trades or zero standard deviation.
fn sharpe_ratio(pnls: &[f64]) -> Option<f64> {
    if pnls.len() < 2 {
        return None;
    }
    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;
    let variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std > 0.0 {
        Some(round_to(mean / std * TRADES_PER_YEAR.sqrt(), 4))
    } else {
        None
    }
}

fn empty(initial_balance: f64) -> BacktestMetrics {
    BacktestMetrics {
        total_trades: 0,
        winning_trades: 0,
        losing_trades: 0,
        win_rate: 0.0,
        total_pnl: 0.0,
        total_pnl_percent: 0.0,
        avg_win: 0.0,
        avg_loss: 0.0,
        profit_factor: None,
        max_drawdown: 0.0,
        max_drawdown_percent: 0.0,
        sharpe_ratio: None,
        best_trade: 0.0,
        worst_trade: 0.0,
        avg_hold_duration_hours: None,
        final_balance: initial_balance,
    }
}
