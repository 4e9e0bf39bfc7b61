//! CSV file market-data adapter.
//!
//! One `{symbol}.csv` file per symbol under a base directory, columns
//! `date,open,high,low,close,volume`, dates as YYYY-MM-DD.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
    date: NaiveDate,
) -> Result<T, BacktestError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| BacktestError::DataIntegrity {
        index: row,
        date,
        reason: format!("missing {name} column"),
    })?;
    raw.parse().map_err(|e| BacktestError::DataIntegrity {
        index: row,
        date,
        reason: format!("invalid {name} value: {e}"),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| BacktestError::DataIntegrity {
                index: row,
                date: start_date,
                reason: format!("CSV parse error: {e}"),
            })?;

            let date_str = record.get(0).ok_or_else(|| BacktestError::DataIntegrity {
                index: row,
                date: start_date,
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BacktestError::DataIntegrity {
                    index: row,
                    date: start_date,
                    reason: format!("invalid date format: {e}"),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: parse_field(&record, 1, "open", row, date)?,
                high: parse_field(&record, 2, "high", row, date)?,
                low: parse_field(&record, 3, "low", row, date)?,
                close: parse_field(&record, 4, "close", row, date)?,
                volume: parse_field(&record, 5, "volume", row, date)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut symbols = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
