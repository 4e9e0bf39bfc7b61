//! Position intent state machine: filtered price + ATR in, target direction out.

use std::fmt;

use super::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Flat,
    Long,
    Short,
}

impl Direction {
    /// +1 for Long, -1 for Short, 0 for Flat.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Flat => 0.0,
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Flat => write!(f, "flat"),
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Per-bar trend state. Entries follow the estimate's slope as long as price
/// has not already run more than `entry_threshold` ATRs past the estimate;
/// exits fire on a slope flip or once the deviation crosses `exit_threshold`.
/// A bar that exits never re-enters on the same bar.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    entry_threshold: f64,
    exit_threshold: f64,
    slope_threshold: f64,
    allow_short: bool,
    state: Direction,
    prev_estimate: Option<f64>,
}

impl SignalGenerator {
    pub fn from_config(config: &EngineConfig) -> Self {
        SignalGenerator {
            entry_threshold: config.entry_threshold,
            exit_threshold: config.exit_threshold,
            slope_threshold: config.slope_threshold,
            allow_short: config.allow_short,
            state: Direction::Flat,
            prev_estimate: None,
        }
    }

    pub fn state(&self) -> Direction {
        self.state
    }

    /// Evaluate one bar and return the target direction. `atr` is `None`
    /// during warm-up, which forbids any transition.
    pub fn on_bar(&mut self, close: f64, estimate: f64, atr: Option<f64>) -> Direction {
        let slope = self.prev_estimate.map(|prev| estimate - prev);
        self.prev_estimate = Some(estimate);

        let (Some(atr), Some(slope)) = (atr, slope) else {
            return self.state;
        };

        // Slope must clear slope_threshold ATRs to count as a trend.
        let gate = self.slope_threshold * atr;
        let trend = if slope > gate {
            1
        } else if slope < -gate {
            -1
        } else {
            0
        };

        // A zero ATR leaves the deviation unnormalizable; no zscore-based moves.
        let zscore = (atr > 0.0).then(|| (close - estimate) / atr);

        self.state = match self.state {
            Direction::Flat => match (trend, zscore) {
                (1, Some(z)) if z <= self.entry_threshold => Direction::Long,
                (-1, Some(z)) if self.allow_short && z >= -self.entry_threshold => {
                    Direction::Short
                }
                _ => Direction::Flat,
            },
            Direction::Long => {
                let reverted = zscore.is_some_and(|z| z >= self.exit_threshold);
                if trend < 0 || reverted {
                    Direction::Flat
                } else {
                    Direction::Long
                }
            }
            Direction::Short => {
                let reverted = zscore.is_some_and(|z| z <= -self.exit_threshold);
                if trend > 0 || reverted {
                    Direction::Flat
                } else {
                    Direction::Short
                }
            }
        };
        self.state
    }
}
