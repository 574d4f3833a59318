pub mod config;
pub mod evaluator;
pub mod params;

pub use config::StrategyFileConfig;
pub use evaluator::{evaluate_signal, Evaluation};
pub use params::{ParamsPatch, StrategyParams};
