//! Building and validating the engine configuration from a config source.
//!
//! All range checks happen here, before any data is fetched; the simulator
//! never sees an invalid configuration.

use crate::domain::config::EngineConfig;
use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;

/// Read the `[engine]` section, falling back to defaults for absent keys,
/// then validate the whole struct.
pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, BacktestError> {
    let defaults = EngineConfig::default();

    let engine = EngineConfig {
        q: config.get_double("engine", "q", defaults.q),
        r: config.get_double("engine", "r", defaults.r),
        initial_covariance: config.get_double(
            "engine",
            "initial_covariance",
            defaults.initial_covariance,
        ),
        atr_window: read_window(config, defaults.atr_window)?,
        entry_threshold: config.get_double("engine", "entry_threshold", defaults.entry_threshold),
        exit_threshold: config.get_double("engine", "exit_threshold", defaults.exit_threshold),
        slope_threshold: config.get_double("engine", "slope_threshold", defaults.slope_threshold),
        allow_short: config.get_bool("engine", "allow_short", defaults.allow_short),
        commission_rate: config.get_double("engine", "commission_rate", defaults.commission_rate),
        exposure_fraction: config.get_double(
            "engine",
            "exposure_fraction",
            defaults.exposure_fraction,
        ),
        initial_capital: config.get_double("engine", "initial_capital", defaults.initial_capital),
    };

    engine.validate()?;
    Ok(engine)
}

fn read_window(config: &dyn ConfigPort, default: usize) -> Result<usize, BacktestError> {
    let raw = config.get_int("engine", "atr_window", default as i64);
    if raw < 1 {
        return Err(BacktestError::ConfigInvalid {
            section: "engine".into(),
            key: "atr_window".into(),
            reason: "atr_window must be at least 1".into(),
        });
    }
    Ok(raw as usize)
}
