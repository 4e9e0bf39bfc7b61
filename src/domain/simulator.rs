//! Bar-by-bar portfolio simulation.
//!
//! Drives the forward pass: ATR update, filter update, signal decision,
//! position transition, mark-to-market, equity sample. One pass, no
//! look-ahead; the equity curve is fully determined by bars + config.

use chrono::NaiveDate;

use super::atr::AtrEstimator;
use super::config::EngineConfig;
use super::error::BacktestError;
use super::kalman::KalmanFilter;
use super::ohlcv::{validate_bars, PriceBar};
use super::signal::{Direction, SignalGenerator};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub period_return: f64,
}

/// The single open position. Size is fixed for the life of the position.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// Units held (notional / entry price).
    pub size: f64,
    pub entry_commission: f64,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * self.size * (price - self.entry_price)
    }
}

/// One completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    /// Entry plus exit commission for this round trip.
    pub commission_paid: f64,
    /// Price P&L net of both commission legs.
    pub realized_pnl: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<ClosedTrade>,
    pub final_equity: f64,
    /// Direction still open when the bars ran out.
    pub final_position: Direction,
}

/// Run the full backtest over a validated-at-entry bar sequence.
///
/// Fails fast on bad config or malformed bars. If equity is depleted the
/// error carries the partial curve and trade log up to the failing bar.
pub fn run_simulation(
    bars: &[PriceBar],
    config: &EngineConfig,
) -> Result<SimulationResult, BacktestError> {
    config.validate()?;
    if bars.is_empty() {
        return Err(BacktestError::NoData);
    }
    validate_bars(bars)?;

    let mut atr = AtrEstimator::new(config.atr_window);
    let mut kalman = KalmanFilter::new(config.q, config.r, config.initial_covariance);
    let mut signal = SignalGenerator::from_config(config);

    let mut equity_basis = config.initial_capital;
    let mut position: Option<Position> = None;
    let mut prev_equity: Option<f64> = None;
    let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(bars.len());
    let mut trades: Vec<ClosedTrade> = Vec::new();

    for (index, bar) in bars.iter().enumerate() {
        atr.update(bar);
        let estimate = kalman.update(bar.close);
        let target = signal.on_bar(bar.close, estimate, atr.value());

        let current = position
            .as_ref()
            .map_or(Direction::Flat, |pos| pos.direction);

        if target != current {
            if let Some(pos) = position.take() {
                let exit_notional = pos.size * bar.close;
                let exit_commission = config.commission_rate * exit_notional;
                let price_pnl = pos.unrealized_pnl(bar.close);
                equity_basis += price_pnl - exit_commission;

                trades.push(ClosedTrade {
                    direction: pos.direction,
                    entry_date: pos.entry_date,
                    exit_date: bar.date,
                    entry_price: pos.entry_price,
                    exit_price: bar.close,
                    size: pos.size,
                    commission_paid: pos.entry_commission + exit_commission,
                    realized_pnl: price_pnl - pos.entry_commission - exit_commission,
                });
            }

            if target != Direction::Flat && equity_basis > 0.0 {
                let notional = equity_basis * config.exposure_fraction;
                let entry_commission = config.commission_rate * notional;
                equity_basis -= entry_commission;
                position = Some(Position {
                    direction: target,
                    entry_date: bar.date,
                    entry_price: bar.close,
                    size: notional / bar.close,
                    entry_commission,
                });
            }
        }

        // Mark-to-market: the curve reflects floating P&L, not only realized.
        let equity = equity_basis
            + position
                .as_ref()
                .map_or(0.0, |pos| pos.unrealized_pnl(bar.close));

        if equity <= 0.0 {
            let final_position = position
                .as_ref()
                .map_or(Direction::Flat, |pos| pos.direction);
            return Err(BacktestError::InsufficientCapital {
                index,
                date: bar.date,
                equity,
                partial: Box::new(SimulationResult {
                    equity_curve,
                    trades,
                    final_equity: equity,
                    final_position,
                }),
            });
        }

        let period_return = match prev_equity {
            Some(prev) => equity / prev - 1.0,
            None => 0.0,
        };
        equity_curve.push(EquityPoint {
            date: bar.date,
            equity,
            period_return,
        });
        prev_equity = Some(equity);
    }

    let final_equity = prev_equity.unwrap_or(config.initial_capital);
    let final_position = position
        .as_ref()
        .map_or(Direction::Flat, |pos| pos.direction);

    Ok(SimulationResult {
        equity_curve,
        trades,
        final_equity,
        final_position,
    })
}
