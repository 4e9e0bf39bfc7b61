//! Domain error types.

use chrono::NaiveDate;

use super::simulator::SimulationResult;

/// Top-level error type for kalmantrader.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("bad bar at index {index} ({date}): {reason}")]
    DataIntegrity {
        index: usize,
        date: NaiveDate,
        reason: String,
    },

    #[error("no price bars supplied")]
    NoData,

    #[error("insufficient capital at bar {index} ({date}): equity {equity:.2}")]
    InsufficientCapital {
        index: usize,
        date: NaiveDate,
        equity: f64,
        /// Equity curve and trade log up to the failing bar, kept for diagnostics.
        partial: Box<SimulationResult>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::DataIntegrity { .. } | BacktestError::NoData => 3,
            BacktestError::InsufficientCapital { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_names_section_and_key() {
        let err = BacktestError::ConfigInvalid {
            section: "engine".into(),
            key: "q".into(),
            reason: "must be positive".into(),
        };
        assert!(err.to_string().contains("[engine] q"));
    }

    #[test]
    fn data_integrity_identifies_bar() {
        let err = BacktestError::DataIntegrity {
            index: 7,
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            reason: "high < low".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("index 7"));
        assert!(msg.contains("2024-01-08"));
        assert!(msg.contains("high < low"));
    }
}
