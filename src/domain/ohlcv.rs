//! OHLCV bar representation and input validation.

use chrono::NaiveDate;

use super::error::BacktestError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    fn finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }
}

/// Check a bar sequence before it reaches the engine: non-empty, finite OHLC,
/// high >= low, strictly increasing dates. The engine never interpolates; a
/// bad bar is the caller's problem to drop or abort on.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), BacktestError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.finite() {
            return Err(BacktestError::DataIntegrity {
                index,
                date: bar.date,
                reason: "non-finite OHLC field".into(),
            });
        }
        if bar.high < bar.low {
            return Err(BacktestError::DataIntegrity {
                index,
                date: bar.date,
                reason: format!("high {} < low {}", bar.high, bar.low),
            });
        }
        if index > 0 && bar.date <= bars[index - 1].date {
            return Err(BacktestError::DataIntegrity {
                index,
                date: bar.date,
                reason: format!("date not after {}", bars[index - 1].date),
            });
        }
    }
    Ok(())
}
