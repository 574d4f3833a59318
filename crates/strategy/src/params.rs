use serde::{Deserialize, Deserializer, Serialize};

use common::{Error, Result};

/// Canonical strategy parameter set shared by the signal generator, the
/// paper simulation and the backtester.
///
/// Two naming conventions exist upstream for the RSI thresholds: the
/// strategy tuner speaks `rsi_buy`/`rsi_sell` while the backtester speaks
/// `rsi_oversold`/`rsi_overbought`. Deserialization accepts both and maps
/// them onto this one field set; canonical names win if both are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyParams {
    /// RSI below this is a buy condition (0-100).
    pub rsi_oversold: f64,
    /// RSI above this is a sell condition (0-100).
    pub rsi_overbought: f64,
    /// Hourly average sentiment must exceed this for a buy condition.
    pub sentiment_min: f64,
    /// Quantity bought on every entry, in base asset units.
    pub position_size: f64,
    /// Stop-loss distance below entry, in percent.
    pub stop_loss_percent: f64,
    /// Take-profit distance above entry, in percent.
    pub take_profit_percent: f64,
    /// Starting balance the equity curve and metrics are based on.
    pub initial_balance: f64,
}

impl Default for StrategyParams {
    /// The balanced preset merged with the backtester defaults.
    fn default() -> Self {
        Self {
            rsi_oversold: 35.0,
            rsi_overbought: 65.0,
            sentiment_min: 0.0,
            position_size: 0.1,
            stop_loss_percent: 3.0,
            take_profit_percent: 5.0,
            initial_balance: 10_000.0,
        }
    }
}

/// Partial parameter override in either naming convention. Absent fields
/// fall back to the defaults, mirroring how callers used to merge dicts
/// onto `DEFAULT_STRATEGY_PARAMS`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsPatch {
    pub rsi_oversold: Option<f64>,
    pub rsi_overbought: Option<f64>,
    /// Tuner-convention alias for `rsi_oversold`.
    pub rsi_buy: Option<f64>,
    /// Tuner-convention alias for `rsi_overbought`.
    pub rsi_sell: Option<f64>,
    pub sentiment_min: Option<f64>,
    pub position_size: Option<f64>,
    pub stop_loss_percent: Option<f64>,
    pub take_profit_percent: Option<f64>,
    pub initial_balance: Option<f64>,
}

impl ParamsPatch {
    /// Resolve aliases and merge onto `base`. Canonical fields take
    /// precedence over their aliases.
    pub fn apply_to(&self, base: &StrategyParams) -> StrategyParams {
        StrategyParams {
            rsi_oversold: self
                .rsi_oversold
                .or(self.rsi_buy)
                .unwrap_or(base.rsi_oversold),
            rsi_overbought: self
                .rsi_overbought
                .or(self.rsi_sell)
                .unwrap_or(base.rsi_overbought),
            sentiment_min: self.sentiment_min.unwrap_or(base.sentiment_min),
            position_size: self.position_size.unwrap_or(base.position_size),
            stop_loss_percent: self.stop_loss_percent.unwrap_or(base.stop_loss_percent),
            take_profit_percent: self
                .take_profit_percent
                .unwrap_or(base.take_profit_percent),
            initial_balance: self.initial_balance.unwrap_or(base.initial_balance),
        }
    }
}

impl<'de> Deserialize<'de> for StrategyParams {
    /// Deserialize via [`ParamsPatch`] so both naming conventions and
    /// partial inputs are accepted anywhere params appear (TOML config,
    /// stored results, API payloads).
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let patch = ParamsPatch::deserialize(deserializer)?;
        Ok(patch.apply_to(&StrategyParams::default()))
    }
}

impl StrategyParams {
    /// Reject out-of-range configuration before a run starts.
    ///
    /// Invalid values are an error, never silently clamped — the only
    /// intentional clamp in the system is [`StrategyParams::from_aggressiveness`],
    /// which bounds its *input* scale.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.rsi_oversold) {
            return Err(Error::InvalidParameters(format!(
                "rsi_oversold must be within 0-100, got {}",
                self.rsi_oversold
            )));
        }
        if !(0.0..=100.0).contains(&self.rsi_overbought) {
            return Err(Error::InvalidParameters(format!(
                "rsi_overbought must be within 0-100, got {}",
                self.rsi_overbought
            )));
        }
        if self.stop_loss_percent < 0.0 {
            return Err(Error::InvalidParameters(format!(
                "stop_loss_percent must be >= 0, got {}",
                self.stop_loss_percent
            )));
        }
        if self.take_profit_percent < 0.0 {
            return Err(Error::InvalidParameters(format!(
                "take_profit_percent must be >= 0, got {}",
                self.take_profit_percent
            )));
        }
        if self.position_size <= 0.0 || !self.position_size.is_finite() {
            return Err(Error::InvalidParameters(format!(
                "position_size must be > 0, got {}",
                self.position_size
            )));
        }
        if self.initial_balance <= 0.0 || !self.initial_balance.is_finite() {
            return Err(Error::InvalidParameters(format!(
                "initial_balance must be > 0, got {}",
                self.initial_balance
            )));
        }
        Ok(())
    }

    /// Conservative preset: tight entries, wide profit target.
    pub fn conservative() -> Self {
        Self {
            rsi_oversold: 25.0,
            rsi_overbought: 75.0,
            sentiment_min: 0.3,
            stop_loss_percent: 2.0,
            take_profit_percent: 8.0,
            ..Self::default()
        }
    }

    /// Balanced preset (the default).
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Aggressive preset: loose entries, quick profit taking.
    pub fn aggressive() -> Self {
        Self {
            rsi_oversold: 45.0,
            rsi_overbought: 55.0,
            sentiment_min: -0.2,
            stop_loss_percent: 5.0,
            take_profit_percent: 3.0,
            ..Self::default()
        }
    }

    /// Derive parameters from a single 0-100 aggressiveness scale by
    /// linear interpolation between the conservative and aggressive
    /// presets. The input is clamped to 0-100; this is the one place
    /// where clamping is intentional.
    pub fn from_aggressiveness(aggressiveness: i64) -> Self {
        let agg = aggressiveness.clamp(0, 100) as f64;
        Self {
            rsi_oversold: 25.0 + agg * 0.2,
            rsi_overbought: 75.0 - agg * 0.2,
            sentiment_min: 0.3 - agg * 0.005,
            stop_loss_percent: 2.0 + agg * 0.03,
            take_profit_percent: 8.0 - agg * 0.05,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        StrategyParams::default().validate().unwrap();
        StrategyParams::conservative().validate().unwrap();
        StrategyParams::aggressive().validate().unwrap();
    }

    #[test]
    fn alias_names_map_onto_canonical_fields() {
        let params: StrategyParams =
            serde_json::from_str(r#"{"rsi_buy": 28.0, "rsi_sell": 72.0}"#).unwrap();
        assert_eq!(params.rsi_oversold, 28.0);
        assert_eq!(params.rsi_overbought, 72.0);
        // untouched fields keep their defaults
        assert_eq!(params.position_size, 0.1);
    }

    #[test]
    fn canonical_names_take_precedence_over_aliases() {
        let params: StrategyParams = serde_json::from_str(
            r#"{"rsi_buy": 28.0, "rsi_oversold": 31.0, "rsi_sell": 72.0, "rsi_overbought": 69.0}"#,
        )
        .unwrap();
        assert_eq!(params.rsi_oversold, 31.0);
        assert_eq!(params.rsi_overbought, 69.0);
    }

    #[test]
    fn alias_round_trip_is_lossless() {
        let via_alias: StrategyParams =
            serde_json::from_str(r#"{"rsi_buy": 40.0, "rsi_sell": 60.0}"#).unwrap();
        let json = serde_json::to_string(&via_alias).unwrap();
        let back: StrategyParams = serde_json::from_str(&json).unwrap();
        assert_eq!(via_alias, back);
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        let mut params = StrategyParams::default();
        params.rsi_oversold = 120.0;
        assert!(params.validate().is_err());

        let mut params = StrategyParams::default();
        params.rsi_overbought = -1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn non_positive_position_size_is_rejected() {
        let mut params = StrategyParams::default();
        params.position_size = 0.0;
        assert!(params.validate().is_err());
        params.position_size = -5.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn negative_percentages_are_rejected() {
        let mut params = StrategyParams::default();
        params.stop_loss_percent = -0.1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn aggressiveness_endpoints_match_presets() {
        let cons = StrategyParams::from_aggressiveness(0);
        assert_eq!(cons.rsi_oversold, 25.0);
        assert_eq!(cons.rsi_overbought, 75.0);
        assert_eq!(cons.take_profit_percent, 8.0);

        let aggr = StrategyParams::from_aggressiveness(100);
        assert_eq!(aggr.rsi_oversold, 45.0);
        assert_eq!(aggr.rsi_overbought, 55.0);
        assert_eq!(aggr.stop_loss_percent, 5.0);
    }

    #[test]
    fn aggressiveness_input_is_clamped() {
        assert_eq!(
            StrategyParams::from_aggressiveness(-50),
            StrategyParams::from_aggressiveness(0)
        );
        assert_eq!(
            StrategyParams::from_aggressiveness(900),
            StrategyParams::from_aggressiveness(100)
        );
    }

    #[test]
    fn derived_params_are_always_valid_across_the_scale() {
        for level in 0..=100 {
            StrategyParams::from_aggressiveness(level).validate().unwrap();
        }
    }
}
