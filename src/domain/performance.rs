//! Performance statistics over the equity curve and trade log.

use super::ohlcv::PriceBar;
use super::simulator::{EquityPoint, SimulationResult};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub cumulative_return: f64,
    pub annualized_return: f64,
    /// `None` when the return series has zero variance.
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub buy_hold_cumulative_return: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
}

/// Benchmark curve: the same capital held from the first bar to the last,
/// no trading, no commission.
pub fn buy_hold_curve(bars: &[PriceBar], initial_capital: f64) -> Vec<EquityPoint> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };
    let units = initial_capital / first.close;

    let mut prev_equity: Option<f64> = None;
    bars.iter()
        .map(|bar| {
            let equity = units * bar.close;
            let period_return = match prev_equity {
                Some(prev) => equity / prev - 1.0,
                None => 0.0,
            };
            prev_equity = Some(equity);
            EquityPoint {
                date: bar.date,
                equity,
                period_return,
            }
        })
        .collect()
}

/// Read-only pass over the strategy result and its benchmark curve.
pub fn analyze(result: &SimulationResult, buy_hold: &[EquityPoint]) -> PerformanceReport {
    let cumulative_return = curve_return(&result.equity_curve);
    let buy_hold_cumulative_return = curve_return(buy_hold);

    let trading_days = result.equity_curve.len() as f64;
    let years = trading_days / TRADING_DAYS_PER_YEAR;
    let annualized_return = if years > 0.0 && cumulative_return > -1.0 {
        (1.0 + cumulative_return).powf(1.0 / years) - 1.0
    } else {
        0.0
    };

    let sharpe_ratio = sharpe(&result.equity_curve);
    let max_drawdown = drawdown(&result.equity_curve);

    let trades_won = result.trades.iter().filter(|t| t.realized_pnl > 0.0).count();
    let trades_lost = result.trades.iter().filter(|t| t.realized_pnl < 0.0).count();
    let win_rate = if result.trades.is_empty() {
        0.0
    } else {
        trades_won as f64 / result.trades.len() as f64
    };

    PerformanceReport {
        cumulative_return,
        annualized_return,
        sharpe_ratio,
        max_drawdown,
        buy_hold_cumulative_return,
        trades_won,
        trades_lost,
        win_rate,
    }
}

fn curve_return(curve: &[EquityPoint]) -> f64 {
    match (curve.first(), curve.last()) {
        (Some(first), Some(last)) if first.equity > 0.0 => last.equity / first.equity - 1.0,
        _ => 0.0,
    }
}

/// Annualized mean/stdev of the per-bar returns, population stdev.
/// A zero-variance series has no defined Sharpe.
fn sharpe(curve: &[EquityPoint]) -> Option<f64> {
    if curve.len() < 2 {
        return None;
    }
    let returns: Vec<f64> = curve.iter().skip(1).map(|p| p.period_return).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        Some(mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        None
    }
}

/// Largest peak-to-trough decline, as a fraction of the peak.
fn drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
