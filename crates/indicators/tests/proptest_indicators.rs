use proptest::prelude::*;

use indicators::{moving_average, Macd, Rsi};

fn price_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..100_000.0, min_len..=max_len)
}

proptest! {
    /// RSI stays inside [0, 100] for any non-degenerate input.
    #[test]
    fn rsi_always_in_range(prices in price_series(15, 300)) {
        let rsi = Rsi::new(14);
        if let Some(v) = rsi.compute(&prices) {
            prop_assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
        }
    }

    /// A window with no negative deltas has zero average loss, which is
    /// defined as RSI = 100 exactly.
    #[test]
    fn rsi_is_100_when_deltas_non_negative(
        start in 1.0f64..1000.0,
        increments in prop::collection::vec(0.0f64..50.0, 14..100),
    ) {
        let mut prices = vec![start];
        for inc in &increments {
            let last = *prices.last().unwrap();
            prices.push(last + inc);
        }
        let rsi = Rsi::new(14);
        prop_assert_eq!(rsi.compute(&prices), Some(100.0));
    }

    /// No-lookahead: the value at index i depends only on prices[0..=i].
    /// Mutating everything after i must not change it.
    #[test]
    fn indicators_ignore_future_bars(
        prices in price_series(60, 300),
        future in prop::collection::vec(1.0f64..100_000.0, 1..50),
    ) {
        let i = prices.len() - 1;
        let rsi = Rsi::new(14);
        let macd = Macd::default();

        let rsi_before = rsi.compute(&prices[..=i]);
        let macd_before = macd.compute(&prices[..=i]);
        let ma_before = moving_average(&prices[..=i], 50);

        let mut extended = prices.clone();
        extended.extend_from_slice(&future);

        prop_assert_eq!(rsi_before, rsi.compute(&extended[..=i]));
        prop_assert_eq!(macd_before, macd.compute(&extended[..=i]));
        prop_assert_eq!(ma_before, moving_average(&extended[..=i], 50));
    }

    /// Moving average of a window lies between that window's min and max.
    #[test]
    fn moving_average_bounded_by_window(prices in price_series(50, 200)) {
        if let Some(ma) = moving_average(&prices, 50) {
            let window = &prices[prices.len() - 50..];
            let min = window.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            // 4-decimal rounding can nudge past the exact bounds
            prop_assert!(ma >= min - 0.0001 && ma <= max + 0.0001);
        }
    }
}
