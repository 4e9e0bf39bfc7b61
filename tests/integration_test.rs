//! End-to-end backtest scenarios.
//!
//! Covers:
//! - flat market: no trades, zero return, undefined Sharpe
//! - price step: filter lag, delayed long entry, benchmark comparison
//! - commission accounting across a full round trip
//! - equity depletion with a truncated diagnostic curve
//! - determinism across identical runs
//! - full pipeline through the CSV data adapter and text report adapter

mod common;

use approx::assert_relative_eq;
use common::*;
use std::fs;

use kalmantrader::adapters::csv_adapter::CsvAdapter;
use kalmantrader::adapters::file_config_adapter::FileConfigAdapter;
use kalmantrader::adapters::text_report_adapter::TextReportAdapter;
use kalmantrader::domain::config::EngineConfig;
use kalmantrader::domain::config_validation::build_engine_config;
use kalmantrader::domain::error::BacktestError;
use kalmantrader::domain::performance::{analyze, buy_hold_curve};
use kalmantrader::domain::signal::Direction;
use kalmantrader::domain::simulator::run_simulation;
use kalmantrader::ports::data_port::DataPort;
use kalmantrader::ports::report_port::ReportPort;

#[test]
fn flat_market_produces_no_trades_and_no_sharpe() {
    let bars = constant_series(30, 100.0);
    let config = EngineConfig::default();

    let result = run_simulation(&bars, &config).unwrap();
    let benchmark = buy_hold_curve(&bars, config.initial_capital);
    let report = analyze(&result, &benchmark);

    assert!(result.trades.is_empty());
    assert_eq!(result.final_position, Direction::Flat);
    assert_relative_eq!(report.cumulative_return, 0.0, epsilon = 1e-12);
    assert_relative_eq!(report.buy_hold_cumulative_return, 0.0, epsilon = 1e-12);
    assert_eq!(report.sharpe_ratio, None);
    assert_relative_eq!(report.max_drawdown, 0.0, epsilon = 1e-12);
}

#[test]
fn price_step_triggers_delayed_long_entry() {
    // 100 for 20 bars, then 110: the filtered estimate lags the step, and the
    // entry waits until price is no longer extended past the estimate
    let bars = step_series(20, 100.0, 45, 110.0);
    let config = EngineConfig::default();

    let result = run_simulation(&bars, &config).unwrap();
    assert_eq!(result.final_position, Direction::Long);

    // entry must come after the step, once zscore re-enters the band
    let entry = result
        .equity_curve
        .iter()
        .position(|p| p.period_return != 0.0)
        .expect("entry leaves a commission mark");
    assert!(entry >= 20, "no entry before the step");
    assert!(entry <= 32, "entry within a few bars of the step");
}

#[test]
fn round_trip_commission_and_trade_log() {
    // step up to force a long, then collapse to force the exit
    let mut bars = step_series(20, 100.0, 45, 110.0);
    bars.extend((45..75).map(|d| make_bar(d, 95.0)));

    // responsive filter and short ATR window: the entry latches cleanly on
    // the up-step and the only exit is the trend flip at the collapse
    let config = EngineConfig {
        q: 0.5,
        r: 0.5,
        atr_window: 5,
        commission_rate: 0.001,
        ..Default::default()
    };
    let result = run_simulation(&bars, &config).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, Direction::Long);

    // both legs charged at rate * notional
    let entry_notional = trade.size * trade.entry_price;
    let exit_notional = trade.size * trade.exit_price;
    assert_relative_eq!(
        trade.commission_paid,
        0.001 * (entry_notional + exit_notional),
        epsilon = 1e-9
    );

    // $10,000 at full exposure: the entry leg costs $10.00 exactly
    assert_relative_eq!(0.001 * entry_notional, 10.0, epsilon = 1e-9);
    assert_relative_eq!(
        trade.realized_pnl,
        trade.size * (trade.exit_price - trade.entry_price) - trade.commission_paid,
        epsilon = 1e-9
    );
}

#[test]
fn equity_depletion_halts_with_diagnostics() {
    // ride a short into a catastrophic gap up
    let mut bars: Vec<_> = (0..20).map(|d| make_bar(d, 1_000.0 - 10.0 * d as f64)).collect();
    bars.push(make_bar(20, 5_000.0));

    let config = EngineConfig {
        q: 0.5,
        r: 0.5,
        atr_window: 5,
        allow_short: true,
        exit_threshold: 3.0,
        ..Default::default()
    };
    let err = run_simulation(&bars, &config).unwrap_err();
    match err {
        BacktestError::InsufficientCapital {
            index,
            equity,
            partial,
            ..
        } => {
            assert_eq!(index, 20);
            assert!(equity <= 0.0);
            assert_eq!(partial.equity_curve.len(), 20);
            assert_eq!(partial.trades.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn identical_runs_are_identical() {
    let bars = step_series(20, 100.0, 60, 110.0);
    let config = EngineConfig {
        allow_short: true,
        ..Default::default()
    };

    let a = run_simulation(&bars, &config).unwrap();
    let b = run_simulation(&bars, &config).unwrap();
    assert_eq!(a, b);

    let report_a = analyze(&a, &buy_hold_curve(&bars, config.initial_capital));
    let report_b = analyze(&b, &buy_hold_curve(&bars, config.initial_capital));
    assert_eq!(report_a, report_b);
}

#[test]
fn mock_data_port_feeds_the_engine() {
    let port = MockDataPort::new().with_bars("ETH-USD", constant_series(30, 100.0));
    let bars = port.fetch_bars("ETH-USD", date(0), date(29)).unwrap();
    assert_eq!(bars.len(), 30);

    let result = run_simulation(&bars, &EngineConfig::default()).unwrap();
    assert!(result.trades.is_empty());
}

#[test]
fn full_pipeline_csv_to_report() {
    let dir = tempfile::TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    // write a rising series as CSV
    let mut csv = String::from("date,open,high,low,close,volume\n");
    for (i, bar) in step_series(20, 100.0, 50, 110.0).iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, 1_000 + i
        ));
    }
    fs::write(data_dir.join("ETH-USD.csv"), csv).unwrap();

    let config_src = format!(
        "[engine]\nq = 0.01\nr = 0.5\ncommission_rate = 0.001\n\n\
         [data]\npath = {}\nsymbol = ETH-USD\n",
        data_dir.display()
    );
    let adapter = FileConfigAdapter::from_string(&config_src).unwrap();
    let engine_config = build_engine_config(&adapter).unwrap();

    let data_port = CsvAdapter::new(data_dir);
    assert_eq!(data_port.list_symbols().unwrap(), vec!["ETH-USD"]);

    let bars = data_port
        .fetch_bars("ETH-USD", date(0), date(49))
        .unwrap();
    assert_eq!(bars.len(), 50);

    let result = run_simulation(&bars, &engine_config).unwrap();
    let report = analyze(&result, &buy_hold_curve(&bars, engine_config.initial_capital));

    let out_dir = dir.path().join("report");
    TextReportAdapter.write(&result, &report, &out_dir).unwrap();

    let summary = fs::read_to_string(out_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("cumulative return:"));
    assert!(summary.contains("buy & hold return:"));

    let equity = fs::read_to_string(out_dir.join("equity.csv")).unwrap();
    // header plus one row per bar
    assert_eq!(equity.lines().count(), 51);
}
