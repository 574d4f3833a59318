use chrono::{DateTime, Utc};
use tracing::debug;

use common::{round_to, ClosedTrade, ExitReason, OpenPosition, SignalAction};
use strategy::StrategyParams;

/// Single-position state machine: the book is either flat or long one
/// position, never more.
///
/// Each bar applies at most one transition, in fixed priority order:
/// stop-loss, take-profit, open-on-BUY, close-on-SELL. A bar that closes
/// a position via SL/TP does not re-open on the same bar even if the
/// signal is BUY.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    open: Option<OpenPosition>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_long(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        self.open.as_ref()
    }

    /// Unrealized P&L of the open position at `price`, 0.0 when flat.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match &self.open {
            Some(pos) => (price - pos.entry_price) * pos.quantity,
            None => 0.0,
        }
    }

    /// Process one bar. Returns the closed trade if a close transition
    /// fired.
    pub fn apply(
        &mut self,
        timestamp: DateTime<Utc>,
        price: f64,
        action: SignalAction,
        rsi: Option<f64>,
        sentiment: Option<f64>,
        params: &StrategyParams,
    ) -> Option<ClosedTrade> {
        if let Some(pos) = self.open.as_ref() {
            let sl_price = pos.entry_price * (1.0 - params.stop_loss_percent / 100.0);
            let tp_price = pos.entry_price * (1.0 + params.take_profit_percent / 100.0);

            if price <= sl_price {
                let pos = self.open.take()?;
                let trade = Self::close(pos, price, timestamp, ExitReason::StopLoss);
                debug!(
                    ts = %timestamp,
                    entry = trade.entry_price,
                    exit = price,
                    pnl = trade.pnl,
                    "Stop-loss hit"
                );
                return Some(trade);
            }

            if price >= tp_price {
                let pos = self.open.take()?;
                let trade = Self::close(pos, price, timestamp, ExitReason::TakeProfit);
                debug!(
                    ts = %timestamp,
                    entry = trade.entry_price,
                    exit = price,
                    pnl = trade.pnl,
                    "Take-profit hit"
                );
                return Some(trade);
            }
        }

        match (self.open.is_some(), action) {
            (false, SignalAction::Buy) => {
                self.open = Some(OpenPosition {
                    entry_price: price,
                    entry_time: timestamp,
                    quantity: params.position_size,
                    entry_rsi: rsi,
                    entry_sentiment: sentiment,
                });
                debug!(ts = %timestamp, price, rsi = ?rsi, sentiment = ?sentiment, "BUY — position opened");
                None
            }
            (true, SignalAction::Sell) => {
                let pos = self.open.take()?;
                let trade = Self::close(pos, price, timestamp, ExitReason::SellSignal);
                debug!(
                    ts = %timestamp,
                    entry = trade.entry_price,
                    exit = price,
                    pnl = trade.pnl,
                    "SELL — position closed"
                );
                Some(trade)
            }
            // HOLD, Flat+SELL and Long+BUY are no-ops
            _ => None,
        }
    }

    /// Close any still-open position at the end of the simulated period.
    pub fn force_close(
        &mut self,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<ClosedTrade> {
        let pos = self.open.take()?;
        Some(Self::close(pos, price, timestamp, ExitReason::PeriodEnd))
    }

    /// Taking the position by value makes a close transition on a flat
    /// book unrepresentable.
    fn close(
        pos: OpenPosition,
        exit_price: f64,
        exit_time: DateTime<Utc>,
        exit_reason: ExitReason,
    ) -> ClosedTrade {
        let (pnl, pnl_percent) = calc_pnl(pos.entry_price, exit_price, pos.quantity);
        ClosedTrade {
            entry_price: pos.entry_price,
            entry_time: pos.entry_time,
            exit_price,
            exit_time,
            quantity: pos.quantity,
            pnl,
            pnl_percent,
            exit_reason,
            rsi: pos.entry_rsi,
            sentiment: pos.entry_sentiment,
        }
    }
}

/// (pnl, pnl_percent), both rounded to 2 decimals. A zero entry price
/// yields 0.0 percent instead of dividing by zero.
fn calc_pnl(entry_price: f64, exit_price: f64, quantity: f64) -> (f64, f64) {
    let pnl = (exit_price - entry_price) * quantity;
    let pnl_percent = if entry_price != 0.0 {
        (exit_price - entry_price) / entry_price * 100.0
    } else {
        0.0
    };
    (round_to(pnl, 2), round_to(pnl_percent, 2))
}
