//! Report generation port trait.

use std::path::Path;

use crate::domain::error::BacktestError;
use crate::domain::performance::PerformanceReport;
use crate::domain::simulator::SimulationResult;

/// Port for writing backtest output artifacts.
pub trait ReportPort {
    fn write(
        &self,
        result: &SimulationResult,
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<(), BacktestError>;
}
