use common::round_to;

/// Minimum number of closes before MACD output is considered meaningful:
/// the 26-period slow EMA plus warm-up buffer.
pub const MIN_MACD_BARS: usize = 35;

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// MACD line = EMA(fast) − EMA(slow); signal line = EMA of the MACD line;
/// histogram = MACD line − signal line.
#[derive(Debug, Clone)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// Latest values of the three MACD components, rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "MACD fast period must be less than slow period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self { fast, slow, signal }
    }

    /// Compute MACD from a slice of close prices (oldest first).
    ///
    /// EMAs are continuously updated from the first value onward (no SMA
    /// warm seed), so every bar of history contributes to the latest
    /// value. Returns `None` with fewer than [`MIN_MACD_BARS`] closes.
    pub fn compute(&self, closes: &[f64]) -> Option<MacdOutput> {
        if closes.len() < MIN_MACD_BARS {
            return None;
        }

        let ema_fast = ema_series(closes, self.fast);
        let ema_slow = ema_series(closes, self.slow);

        let macd_line: Vec<f64> = ema_fast
            .iter()
            .zip(&ema_slow)
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = ema_series(&macd_line, self.signal);

        let macd = *macd_line.last()?;
        let signal = *signal_line.last()?;

        Some(MacdOutput {
            macd_line: round_to(macd, 4),
            signal_line: round_to(signal, 4),
            histogram: round_to(macd - signal, 4),
        })
    }
}

/// Full exponential moving average series with smoothing factor 2/(N+1).
/// Seeded with the first value, then recursively updated — one output per
/// input.
fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    let mut prev = match data.first() {
        Some(&v) => v,
        None => return out,
    };
    out.push(prev);
    for &value in &data[1..] {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_returns_none_below_minimum_bars() {
        let macd = Macd::default();
        let prices = vec![100.0; MIN_MACD_BARS - 1];
        assert!(macd.compute(&prices).is_none());
    }

    #[test]
    fn macd_returns_some_at_minimum_bars() {
        let macd = Macd::default();
        let prices: Vec<f64> = (0..MIN_MACD_BARS).map(|i| 100.0 + i as f64).collect();
        assert!(macd.compute(&prices).is_some());
    }

    #[test]
    fn macd_flat_series_is_all_zero() {
        let macd = Macd::default();
        let prices = vec![250.0; 60];
        let out = macd.compute(&prices).unwrap();
        assert_eq!(out.macd_line, 0.0);
        assert_eq!(out.signal_line, 0.0);
        assert_eq!(out.histogram, 0.0);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        // Fast EMA tracks a rising series more closely than the slow EMA
        let macd = Macd::default();
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let out = macd.compute(&prices).unwrap();
        assert!(out.macd_line > 0.0, "macd_line = {}", out.macd_line);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let macd = Macd::default();
        let mut prices: Vec<f64> = (0..40).map(|i| 100.0 - i as f64 * 0.5).collect();
        prices.extend((0..20).map(|i| 80.0 + i as f64 * 1.5));
        let out = macd.compute(&prices).unwrap();
        let expected = round_to(out.macd_line - out.signal_line, 4);
        // Components are rounded independently; allow the last-digit wobble
        assert!(
            (out.histogram - expected).abs() <= 0.0002,
            "histogram {} vs {}",
            out.histogram,
            expected
        );
    }

    #[test]
    fn ema_series_matches_hand_computed_values() {
        // period 3 → k = 0.5
        let series = ema_series(&[2.0, 4.0, 8.0], 3);
        assert_eq!(series, vec![2.0, 3.0, 5.5]);
    }
}
