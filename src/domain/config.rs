//! Engine configuration and fail-fast validation.

use super::error::BacktestError;

/// All tunables for one backtest run. Validated once, up front; the engine
/// itself assumes every field is in range.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Kalman process noise. Larger Q lets the estimate chase price faster.
    pub q: f64,
    /// Kalman measurement noise. Larger R smooths harder.
    pub r: f64,
    /// Initial error covariance for the filter.
    pub initial_covariance: f64,
    pub atr_window: usize,
    /// Max Zscore extension (in ATRs) still allowed when entering with the trend.
    pub entry_threshold: f64,
    /// Zscore at which an open position is closed back toward the estimate.
    pub exit_threshold: f64,
    /// Minimum estimate slope, in ATR multiples, before a trend counts.
    pub slope_threshold: f64,
    pub allow_short: bool,
    /// Fraction of the traded notional charged per executed leg.
    pub commission_rate: f64,
    /// Fraction of equity committed to each new position.
    pub exposure_fraction: f64,
    pub initial_capital: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            q: 0.01,
            r: 0.5,
            initial_covariance: 1.0,
            atr_window: 14,
            entry_threshold: 1.5,
            exit_threshold: 0.5,
            slope_threshold: 0.0,
            allow_short: false,
            commission_rate: 0.001,
            exposure_fraction: 1.0,
            initial_capital: 10_000.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        let invalid = |key: &str, reason: &str| BacktestError::ConfigInvalid {
            section: "engine".into(),
            key: key.into(),
            reason: reason.into(),
        };

        if !(self.q > 0.0) {
            return Err(invalid("q", "process noise must be positive"));
        }
        if !(self.r > 0.0) {
            return Err(invalid("r", "measurement noise must be positive"));
        }
        if !(self.initial_covariance >= 0.0) {
            return Err(invalid(
                "initial_covariance",
                "initial covariance must be non-negative",
            ));
        }
        if self.atr_window < 1 {
            return Err(invalid("atr_window", "atr_window must be at least 1"));
        }
        if !self.entry_threshold.is_finite() || !self.exit_threshold.is_finite() {
            return Err(invalid("entry_threshold", "thresholds must be finite"));
        }
        if !(self.slope_threshold >= 0.0) {
            return Err(invalid(
                "slope_threshold",
                "slope_threshold must be non-negative",
            ));
        }
        if !(self.commission_rate >= 0.0) {
            return Err(invalid(
                "commission_rate",
                "commission_rate must be non-negative",
            ));
        }
        if !(self.exposure_fraction > 0.0 && self.exposure_fraction <= 1.0) {
            return Err(invalid(
                "exposure_fraction",
                "exposure_fraction must be in (0, 1]",
            ));
        }
        if !(self.initial_capital > 0.0) {
            return Err(invalid(
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_q() {
        let config = EngineConfig {
            q: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            q: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nan_q() {
        let config = EngineConfig {
            q: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_r() {
        let config = EngineConfig {
            r: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_atr_window() {
        let config = EngineConfig {
            atr_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_commission() {
        let config = EngineConfig {
            commission_rate: -0.001,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_exposure_out_of_range() {
        for bad in [0.0, -0.5, 1.5] {
            let config = EngineConfig {
                exposure_fraction: bad,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "exposure {bad} should fail");
        }
    }

    #[test]
    fn accepts_full_exposure() {
        let config = EngineConfig {
            exposure_fraction: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
