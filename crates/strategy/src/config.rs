use serde::Deserialize;
use tracing::info;

use common::{Error, Result};

use crate::params::{ParamsPatch, StrategyParams};

/// Strategy configuration file (TOML).
///
/// Example `config/strategy.toml`:
/// ```toml
/// name = "BTC balanced"
/// symbol = "BTC/USDT"
///
/// [params]
/// rsi_oversold = 35.0
/// rsi_overbought = 65.0
/// sentiment_min = 0.0
/// position_size = 0.1
/// stop_loss_percent = 3.0
/// take_profit_percent = 5.0
/// initial_balance = 10000.0
/// ```
///
/// The `[params]` table may be partial and may use either RSI naming
/// convention; omitted fields fall back to the balanced defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyFileConfig {
    /// Human-readable name shown in logs.
    pub name: String,
    /// Trading pair, e.g. "BTC/USDT".
    pub symbol: String,
    #[serde(default)]
    params: ParamsPatch,
}

impl StrategyFileConfig {
    /// Load and parse a strategy config from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        let cfg: Self = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse strategy config at '{path}': {e}"))
        })?;
        info!(name = %cfg.name, symbol = %cfg.symbol, "Loaded strategy config");
        Ok(cfg)
    }

    /// Resolve the file's (possibly partial, possibly alias-named)
    /// parameter table onto the defaults.
    pub fn params(&self) -> StrategyParams {
        self.params.apply_to(&StrategyParams::default())
    }
}
