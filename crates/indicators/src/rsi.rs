use common::round_to;

/// RSI (Relative Strength Index) indicator.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI).
/// Returns `None` until at least `period + 1` close values are available.
#[derive(Debug, Clone)]
pub struct Rsi {
    pub period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    ///
    /// Seeds the average gain/loss from the first `period` deltas, then
    /// applies Wilder smoothing over the rest. A window with zero average
    /// loss yields exactly 100. Result is in [0, 100], rounded to
    /// 2 decimals. Returns `None` with fewer than `period + 1` values.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.period + 1 {
            return None;
        }

        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let seed = &deltas[..self.period];

        let mut avg_gain =
            seed.iter().filter(|&&d| d > 0.0).sum::<f64>() / self.period as f64;
        let mut avg_loss = seed.iter().filter(|&&d| d < 0.0).map(|d| d.abs()).sum::<f64>()
            / self.period as f64;

        for &delta in &deltas[self.period..] {
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            avg_gain = (avg_gain * (self.period - 1) as f64 + gain) / self.period as f64;
            avg_loss = (avg_loss * (self.period - 1) as f64 + loss) / self.period as f64;
        }

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(round_to(100.0 - 100.0 / (1.0 + rs), 2))
    }
}
