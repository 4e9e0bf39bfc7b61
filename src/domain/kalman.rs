//! Scalar Kalman filter over the close-price stream.
//!
//! Random-walk state model: the prior estimate carries over unchanged and the
//! covariance inflates by Q each bar, then the observation pulls the estimate
//! back with gain K = P / (P + R).

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    q: f64,
    r: f64,
    initial_covariance: f64,
    state: Option<FilterState>,
}

#[derive(Debug, Clone, Copy)]
struct FilterState {
    estimate: f64,
    covariance: f64,
}

impl KalmanFilter {
    /// Q and R must already be validated positive by `EngineConfig::validate`.
    pub fn new(q: f64, r: f64, initial_covariance: f64) -> Self {
        KalmanFilter {
            q,
            r,
            initial_covariance,
            state: None,
        }
    }

    /// Fold one observed close into the estimate and return the new estimate.
    /// The first observation seeds the state directly.
    pub fn update(&mut self, z: f64) -> f64 {
        match self.state {
            None => {
                self.state = Some(FilterState {
                    estimate: z,
                    covariance: self.initial_covariance,
                });
                z
            }
            Some(prev) => {
                let p_pred = prev.covariance + self.q;
                let gain = p_pred / (p_pred + self.r);
                let estimate = prev.estimate + gain * (z - prev.estimate);
                let covariance = (1.0 - gain) * p_pred;
                self.state = Some(FilterState {
                    estimate,
                    covariance,
                });
                estimate
            }
        }
    }

    pub fn estimate(&self) -> Option<f64> {
        self.state.map(|s| s.estimate)
    }

    #[cfg(test)]
    fn covariance(&self) -> Option<f64> {
        self.state.map(|s| s.covariance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn make_filter() -> KalmanFilter {
        KalmanFilter::new(0.01, 0.5, 1.0)
    }

    #[test]
    fn first_observation_seeds_estimate() {
        let mut kf = make_filter();
        assert_eq!(kf.estimate(), None);
        let e = kf.update(100.0);
        assert!((e - 100.0).abs() < f64::EPSILON);
        assert!((kf.covariance().unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn second_update_matches_hand_computation() {
        let mut kf = make_filter();
        kf.update(100.0);
        let e = kf.update(110.0);

        // P_pred = 1.0 + 0.01, K = 1.01 / 1.51
        let gain = 1.01 / 1.51;
        assert_relative_eq!(e, 100.0 + gain * 10.0, epsilon = 1e-12);
        assert_relative_eq!(
            kf.covariance().unwrap(),
            (1.0 - gain) * 1.01,
            epsilon = 1e-12
        );
    }

    #[test]
    fn converges_on_constant_series() {
        let mut kf = make_filter();
        let mut e = 0.0;
        for _ in 0..200 {
            e = kf.update(42.0);
        }
        assert_relative_eq!(e, 42.0, epsilon = 1e-6);
    }

    #[test]
    fn lags_then_follows_a_step() {
        let mut kf = make_filter();
        for _ in 0..20 {
            kf.update(100.0);
        }
        let first_after_step = kf.update(110.0);
        assert!(first_after_step > 100.0 && first_after_step < 110.0);

        let mut e = first_after_step;
        for _ in 0..100 {
            e = kf.update(110.0);
        }
        assert_relative_eq!(e, 110.0, epsilon = 1e-3);
    }

    proptest! {
        #[test]
        fn covariance_stays_non_negative(
            q in 1e-6f64..1.0,
            r in 1e-6f64..10.0,
            prices in proptest::collection::vec(1.0f64..10_000.0, 1..200),
        ) {
            let mut kf = KalmanFilter::new(q, r, 1.0);
            for p in prices {
                kf.update(p);
                prop_assert!(kf.covariance().unwrap() >= 0.0);
            }
        }

        #[test]
        fn estimate_bounded_by_prior_and_observation(
            z in 1.0f64..1000.0,
            prior in 1.0f64..1000.0,
        ) {
            let mut kf = make_filter();
            kf.update(prior);
            let e = kf.update(z);
            let (lo, hi) = if prior < z { (prior, z) } else { (z, prior) };
            prop_assert!(e >= lo - 1e-9 && e <= hi + 1e-9);
        }
    }
}
