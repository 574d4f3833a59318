use common::round_to;

/// Simple moving averages at the three conventional trend horizons.
/// A field is `None` when the series is shorter than its period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovingAverages {
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
}

/// Arithmetic mean of the trailing `period` closes, rounded to 4 decimals.
/// Returns `None` if fewer than `period` values are available.
pub fn moving_average(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(round_to(window.iter().sum::<f64>() / period as f64, 4))
}

/// Compute MA(20), MA(50) and MA(200) in one call.
pub fn moving_averages(closes: &[f64]) -> MovingAverages {
    MovingAverages {
        ma_20: moving_average(closes, 20),
        ma_50: moving_average(closes, 50),
        ma_200: moving_average(closes, 200),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ma_none_when_insufficient_data() {
        let prices = vec![1.0; 19];
        assert!(moving_average(&prices, 20).is_none());
    }

    #[test]
    fn ma_uses_trailing_window_only() {
        // 5 old bars at 1000 must not leak into MA(3) of the last three
        let prices = vec![1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1.0, 2.0, 3.0];
        assert_eq!(moving_average(&prices, 3), Some(2.0));
    }

    #[test]
    fn ma_rounds_to_four_decimals() {
        let prices = vec![1.0, 2.0, 2.0];
        // mean = 1.666666...
        assert_eq!(moving_average(&prices, 3), Some(1.6667));
    }

    #[test]
    fn named_periods_fill_in_as_data_grows() {
        let short: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let mas = moving_averages(&short);
        assert!(mas.ma_20.is_some());
        assert!(mas.ma_50.is_some());
        assert!(mas.ma_200.is_none());

        let long: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let mas = moving_averages(&long);
        assert!(mas.ma_200.is_some());
    }
}
