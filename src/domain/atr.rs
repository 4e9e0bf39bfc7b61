//! Rolling Average True Range over a fixed window.
//!
//! Simple moving average of true range, not Wilder smoothing, matching the
//! rolling-mean form of the signal model. O(1) per bar: a circular buffer of
//! TR values plus a running sum.

use super::ohlcv::PriceBar;

#[derive(Debug, Clone)]
pub struct AtrEstimator {
    window: usize,
    buffer: Vec<f64>,
    next: usize,
    filled: usize,
    sum: f64,
    prev_close: Option<f64>,
}

impl AtrEstimator {
    /// `window` must be >= 1, enforced by `EngineConfig::validate`.
    pub fn new(window: usize) -> Self {
        AtrEstimator {
            window,
            buffer: vec![0.0; window],
            next: 0,
            filled: 0,
            sum: 0.0,
            prev_close: None,
        }
    }

    /// Fold one bar into the window. The first bar has no prior close, so its
    /// true range degenerates to high - low.
    pub fn update(&mut self, bar: &PriceBar) {
        let tr = match self.prev_close {
            Some(prev) => bar.true_range(prev),
            None => bar.high - bar.low,
        };
        self.prev_close = Some(bar.close);

        if self.filled == self.window {
            self.sum -= self.buffer[self.next];
        } else {
            self.filled += 1;
        }
        self.buffer[self.next] = tr;
        self.sum += tr;
        self.next = (self.next + 1) % self.window;
    }

    /// Current ATR, or `None` until `window` bars have been observed.
    pub fn value(&self) -> Option<f64> {
        if self.filled == self.window {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }

    pub fn is_warmed_up(&self) -> bool {
        self.filled == self.window
    }
}
