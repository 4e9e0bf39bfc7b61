//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::config_validation::build_engine_config;
use crate::domain::error::BacktestError;
use crate::domain::performance::{analyze, buy_hold_curve};
use crate::domain::simulator::{run_simulation, SimulationResult};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "kalmantrader", about = "Kalman-filter trend backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for summary.txt, equity.csv, trades.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
        } => run_backtest(&config, output.as_deref(), symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = BacktestError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(
    config_path: &Path,
    output_dir: Option<&Path>,
    symbol_override: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let engine_config = match build_engine_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let (start_date, end_date) = match resolve_date_range(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = make_data_port(&adapter);
    eprintln!("Fetching bars for {symbol}...");
    let bars = match data_port.fetch_bars(&symbol, start_date, end_date) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Running backtest over {} bars", bars.len());

    let (result, exit) = match run_simulation(&bars, &engine_config) {
        Ok(result) => (result, ExitCode::SUCCESS),
        Err(e @ BacktestError::InsufficientCapital { .. }) => {
            eprintln!("error: {e}");
            let code = ExitCode::from(&e);
            let BacktestError::InsufficientCapital { partial, .. } = e else {
                unreachable!()
            };
            // partial curve and trade log are still worth reporting
            (*partial, code)
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let benchmark = buy_hold_curve(&bars, engine_config.initial_capital);
    let report = analyze(&result, &benchmark);

    print_summary(&result, &report);

    if let Some(dir) = output_dir {
        if let Err(e) = TextReportAdapter.write(&result, &report, dir) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Wrote report to {}", dir.display());
    }

    exit
}

fn print_summary(
    result: &SimulationResult,
    report: &crate::domain::performance::PerformanceReport,
) {
    println!(
        "cumulative return: {:.2}%  (buy & hold: {:.2}%)",
        report.cumulative_return * 100.0,
        report.buy_hold_cumulative_return * 100.0
    );
    match report.sharpe_ratio {
        Some(sharpe) => println!("sharpe ratio:      {sharpe:.2}"),
        None => println!("sharpe ratio:      n/a"),
    }
    println!("max drawdown:      {:.2}%", report.max_drawdown * 100.0);
    println!(
        "trades:            {} ({:.0}% win rate)",
        result.trades.len(),
        report.win_rate * 100.0
    );
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match build_engine_config(&adapter) {
        Ok(_) => {
            println!("configuration OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_port = make_data_port(&adapter);
    match data_port.list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn make_data_port(adapter: &dyn ConfigPort) -> CsvAdapter {
    let base = adapter
        .get_string("data", "path")
        .unwrap_or_else(|| ".".to_string());
    CsvAdapter::new(PathBuf::from(base))
}

fn resolve_symbol(
    symbol_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<String, ExitCode> {
    if let Some(symbol) = symbol_override {
        return Ok(symbol.to_string());
    }
    match adapter.get_string("data", "symbol") {
        Some(symbol) if !symbol.trim().is_empty() => Ok(symbol),
        _ => {
            let err = BacktestError::ConfigMissing {
                section: "data".into(),
                key: "symbol".into(),
            };
            eprintln!("error: {err}");
            Err(ExitCode::from(&err))
        }
    }
}

fn resolve_date_range(
    adapter: &dyn ConfigPort,
) -> Result<(NaiveDate, NaiveDate), BacktestError> {
    let parse = |key: &str, fallback: NaiveDate| -> Result<NaiveDate, BacktestError> {
        match adapter.get_string("data", key) {
            None => Ok(fallback),
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                BacktestError::ConfigInvalid {
                    section: "data".into(),
                    key: key.into(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                }
            }),
        }
    };

    let start_date = parse("start_date", NaiveDate::MIN)?;
    let end_date = parse("end_date", NaiveDate::MAX)?;
    if start_date >= end_date {
        return Err(BacktestError::ConfigInvalid {
            section: "data".into(),
            key: "start_date".into(),
            reason: "start_date must be before end_date".into(),
        });
    }
    Ok((start_date, end_date))
}
