//! Market-data access port trait.

use chrono::NaiveDate;

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::PriceBar;

/// Supplier of chronologically ordered price bars. The engine only requires
/// the sequence to be non-empty and clean; validation happens at this
/// boundary via `ohlcv::validate_bars`.
pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError>;

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError>;
}
