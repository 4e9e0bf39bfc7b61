//! Plain-text report adapter implementing ReportPort.
//!
//! Writes three artifacts into the output directory: `summary.txt` with the
//! headline statistics, `equity.csv` with the full equity curve, and
//! `trades.csv` with one row per completed round trip.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::error::BacktestError;
use crate::domain::performance::PerformanceReport;
use crate::domain::simulator::SimulationResult;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl TextReportAdapter {
    fn render_summary(result: &SimulationResult, report: &PerformanceReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Backtest summary");
        let _ = writeln!(out, "================");
        let _ = writeln!(out, "bars:                {}", result.equity_curve.len());
        let _ = writeln!(out, "final equity:        {:.2}", result.final_equity);
        let _ = writeln!(
            out,
            "cumulative return:   {:.2}%",
            report.cumulative_return * 100.0
        );
        let _ = writeln!(
            out,
            "annualized return:   {:.2}%",
            report.annualized_return * 100.0
        );
        match report.sharpe_ratio {
            Some(sharpe) => {
                let _ = writeln!(out, "sharpe ratio:        {sharpe:.2}");
            }
            None => {
                let _ = writeln!(out, "sharpe ratio:        n/a (zero variance)");
            }
        }
        let _ = writeln!(
            out,
            "max drawdown:        {:.2}%",
            report.max_drawdown * 100.0
        );
        let _ = writeln!(
            out,
            "buy & hold return:   {:.2}%",
            report.buy_hold_cumulative_return * 100.0
        );
        let _ = writeln!(
            out,
            "trades:              {} ({} won / {} lost, {:.0}% win rate)",
            result.trades.len(),
            report.trades_won,
            report.trades_lost,
            report.win_rate * 100.0
        );
        let _ = writeln!(out, "open position:       {}", result.final_position);
        out
    }

    fn write_equity_csv(result: &SimulationResult, path: &Path) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_io)?;
        wtr.write_record(["date", "equity", "period_return"])
            .map_err(csv_io)?;
        for point in &result.equity_curve {
            wtr.write_record([
                point.date.to_string(),
                format!("{:.6}", point.equity),
                format!("{:.8}", point.period_return),
            ])
            .map_err(csv_io)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades_csv(result: &SimulationResult, path: &Path) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_io)?;
        wtr.write_record([
            "entry_date",
            "exit_date",
            "direction",
            "entry_price",
            "exit_price",
            "size",
            "commission_paid",
            "realized_pnl",
        ])
        .map_err(csv_io)?;
        for trade in &result.trades {
            wtr.write_record([
                trade.entry_date.to_string(),
                trade.exit_date.to_string(),
                trade.direction.to_string(),
                format!("{:.6}", trade.entry_price),
                format!("{:.6}", trade.exit_price),
                format!("{:.6}", trade.size),
                format!("{:.6}", trade.commission_paid),
                format!("{:.6}", trade.realized_pnl),
            ])
            .map_err(csv_io)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn csv_io(err: csv::Error) -> BacktestError {
    BacktestError::Io(std::io::Error::other(err))
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &SimulationResult,
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<(), BacktestError> {
        fs::create_dir_all(output_dir)?;
        fs::write(
            output_dir.join("summary.txt"),
            Self::render_summary(result, report),
        )?;
        Self::write_equity_csv(result, &output_dir.join("equity.csv"))?;
        Self::write_trades_csv(result, &output_dir.join("trades.csv"))?;
        Ok(())
    }
}
