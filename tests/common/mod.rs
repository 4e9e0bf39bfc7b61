//! Shared helpers for integration tests.

use chrono::{Days, NaiveDate};
use std::collections::HashMap;

use kalmantrader::domain::error::BacktestError;
use kalmantrader::domain::ohlcv::PriceBar;
use kalmantrader::ports::data_port::DataPort;

pub fn date(day: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(day))
        .unwrap()
}

/// A bar with a one-point range either side of the close.
pub fn make_bar(day: u64, close: f64) -> PriceBar {
    PriceBar {
        date: date(day),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
    }
}

pub fn constant_series(n: u64, close: f64) -> Vec<PriceBar> {
    (0..n).map(|d| make_bar(d, close)).collect()
}

/// `n_before` bars at `before`, then bars at `after` until `n_total`.
pub fn step_series(n_before: u64, before: f64, n_total: u64, after: f64) -> Vec<PriceBar> {
    (0..n_total)
        .map(|d| make_bar(d, if d < n_before { before } else { after }))
        .collect()
}

/// In-memory DataPort for pipeline tests.
pub struct MockDataPort {
    bars: HashMap<String, Vec<PriceBar>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        MockDataPort {
            bars: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let bars = self.bars.get(symbol).cloned().unwrap_or_default();
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let mut symbols: Vec<String> = self.bars.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}
