pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Round `value` to `decimals` decimal places.
///
/// All engine outputs are rounded before they land in a result record
/// (2 decimals for money, 4 for indicator values), so downstream
/// serialization is stable across runs.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn round_to_two_decimals() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(-0.005, 2), -0.01);
        assert_eq!(round_to(100.0, 2), 100.0);
    }

    #[test]
    fn round_to_four_decimals() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
    }
}
