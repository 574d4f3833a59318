//! Technical indicators computed from close-price windows.
//!
//! All functions are pure: they see only the slice the caller passes, so
//! evaluating at bar `i` with `&closes[..=i]` structurally cannot read
//! future bars.

pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use macd::{Macd, MacdOutput, MIN_MACD_BARS};
pub use moving_average::{moving_average, moving_averages, MovingAverages};
pub use rsi::Rsi;
