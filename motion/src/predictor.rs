//! Period, phase and shoot-time prediction from turning points.
//!
//! Phase counts half-cycles of the bob: every observed turning point adds
//! 0.5 and the time since the newest one is extrapolated at the estimated
//! period. Phase 4.0 (two full bobs) is the shoot.

use serde::{Deserialize, Serialize};
use shared::clock::Clock;
use shared::rate_limit::RateLimiter;

use crate::config::{MotionConfig, MotionConfigError};
use crate::filter::{FilteredState, StateFilter};
use crate::history::History;
use crate::resample::resample;
use crate::turning_points::{self, TurningPoint};

/// Phase at which the throw lands.
pub const SHOOT_PHASE: f64 = 4.0;

/// Snapshot of the estimator's belief at `computed_at`.
///
/// All fields are produced together; a prediction is never partially
/// updated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionPrediction {
    /// Full bob period (seconds)
    pub period: f64,
    /// Half-cycles completed at `computed_at`
    pub phase: f64,
    /// Time at which the phase reaches [`SHOOT_PHASE`]
    pub eta: f64,
    pub computed_at: f64,
    /// Turning points the prediction was built from
    pub turning_points: usize,
}

impl MotionPrediction {
    /// Phase extrapolated to `now`. Never earlier than `computed_at`.
    pub fn phase_at(&self, now: f64) -> f64 {
        self.phase + (now - self.computed_at).max(0.0) / self.period
    }

    /// Time at which the phase is projected to reach `target`.
    pub fn time_of_phase(&self, target: f64) -> f64 {
        self.computed_at + (target - self.phase) * self.period
    }
}

/// Turn a turning-point sequence into a prediction at `now`.
///
/// Returns `None` for every insufficient-evidence case: no points, points
/// not alternating peak/valley, more than `max_turning_points`, or a newest
/// point older than one period.
pub fn predict(
    points: &[TurningPoint],
    now: f64,
    max_turning_points: usize,
    default_period: f64,
) -> Option<MotionPrediction> {
    let (first, last) = (points.first()?, points.last()?);

    if !turning_points::is_alternating(points) {
        log::debug!("Turning points do not alternate, dropping prediction");
        return None;
    }
    if points.len() > max_turning_points {
        log::debug!(
            "{} turning points exceeds {max_turning_points}, shoot already passed",
            points.len()
        );
        return None;
    }

    let count = points.len();
    let period = if count >= 2 {
        (last.timestamp - first.timestamp) / (count - 1) as f64 * 2.0
    } else {
        default_period
    };
    if period <= 0.0 {
        return None;
    }

    let since_last = now - last.timestamp;
    if since_last > period {
        log::debug!("Motion stale: {since_last:.2}s since last turning point (period {period:.2}s)");
        return None;
    }

    let phase = 0.5 * count as f64 + since_last / period;
    Some(MotionPrediction {
        period,
        phase,
        eta: now + (SHOOT_PHASE - phase) * period,
        computed_at: now,
        turning_points: count,
    })
}

/// Periodic-motion estimator fed one height sample per frame.
pub struct MotionAnalyzer<C: Clock> {
    config: MotionConfig,
    clock: C,
    history: History,
    recompute_gate: RateLimiter,
    turning_points: Vec<TurningPoint>,
    prediction: Option<MotionPrediction>,
}

impl<C: Clock> MotionAnalyzer<C> {
    pub fn new(config: MotionConfig, clock: C) -> Result<Self, MotionConfigError> {
        config.validate()?;
        let history = History::new(config.history_capacity, StateFilter::from_config(&config));
        let recompute_gate = RateLimiter::new(config.recompute_interval_secs);
        Ok(Self {
            config,
            clock,
            history,
            recompute_gate,
            turning_points: Vec::new(),
            prediction: None,
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Record a height sample (or its absence) and, if the recompute interval
    /// has passed, refresh the prediction.
    ///
    /// Samples not newer than the newest stored one are ignored and return
    /// false.
    pub fn add_sample(&mut self, timestamp: f64, height: Option<f64>) -> bool {
        if !self.history.add_sample(timestamp, height) {
            return false;
        }

        let now = self.clock.now();
        if self.recompute_gate.try_acquire(now) {
            self.recompute(now);
        }
        true
    }

    /// Record a sample stamped with the current clock reading.
    pub fn add_sample_now(&mut self, height: Option<f64>) -> bool {
        let now = self.clock.now();
        self.add_sample(now, height)
    }

    /// Filtered samples within `window_secs` of `now`, oldest first.
    pub fn filtered_since(
        &self,
        now: f64,
        window_secs: f64,
    ) -> impl Iterator<Item = (f64, FilteredState)> + '_ {
        self.history.filtered_since(now, window_secs)
    }

    /// Turning points found by the last recomputation.
    pub fn turning_points(&self) -> &[TurningPoint] {
        &self.turning_points
    }

    pub fn prediction(&self) -> Option<MotionPrediction> {
        self.prediction
    }

    /// Live phase at the current clock reading.
    pub fn phase_now(&self) -> Option<f64> {
        self.prediction.map(|p| p.phase_at(self.clock.now()))
    }

    /// Rebuild turning points and the prediction from the window ending at
    /// `now`, ignoring the rate limit.
    pub fn recompute(&mut self, now: f64) {
        let window: Vec<(f64, FilteredState)> =
            self.history.filtered_since(now, self.config.lookback_secs).collect();

        if window.len() < self.config.min_window_points {
            log::trace!("Only {} filtered samples in window", window.len());
            self.turning_points.clear();
            self.prediction = None;
            return;
        }

        let (timestamps, heights): (Vec<f64>, Vec<f64>) =
            window.iter().map(|(ts, f)| (*ts, f.position)).unzip();

        let series = match resample(
            self.config.resample_method,
            &timestamps,
            &heights,
            self.config.resample_count,
        ) {
            Ok(series) => series,
            Err(e) => {
                log::warn!("Resampling failed: {e}");
                self.turning_points.clear();
                self.prediction = None;
                return;
            }
        };

        let mut points = turning_points::detect(
            &series.timestamps.to_vec(),
            &series.values.to_vec(),
            self.config.prominence,
        );
        turning_points::trim_leading_valley(&mut points);

        let previous = self.prediction;
        let mut prediction = predict(
            &points,
            now,
            self.config.max_turning_points,
            self.config.default_period_secs,
        );

        // Keep phase non-decreasing between recomputations of the same motion
        if let (Some(p), Some(prev)) = (prediction.as_mut(), previous) {
            if p.turning_points >= prev.turning_points {
                let carried = prev.phase_at(now);
                if carried > p.phase {
                    p.phase = carried;
                    p.eta = now + (SHOOT_PHASE - carried) * p.period;
                }
            }
        }

        if let Some(p) = prediction {
            log::debug!(
                "Prediction: period {:.3}s phase {:.2} eta {:.2} from {} turning points",
                p.period,
                p.phase,
                p.eta,
                p.turning_points
            );
        }

        self.turning_points = points;
        self.prediction = prediction;
    }

    /// Forget all samples and predictions.
    pub fn reset(&mut self) {
        self.history.clear();
        self.recompute_gate.reset();
        self.turning_points.clear();
        self.prediction = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turning_points::TurningKind;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::{Distribution, Normal};
    use shared::clock::ManualClock;
    use std::f64::consts::PI;

    const FPS: f64 = 30.0;

    fn analyzer() -> (MotionAnalyzer<ManualClock>, ManualClock) {
        let clock = ManualClock::starting_at(0.0);
        let analyzer = MotionAnalyzer::new(MotionConfig::default(), clock.clone()).unwrap();
        (analyzer, clock)
    }

    fn tp(timestamp: f64, kind: TurningKind) -> TurningPoint {
        TurningPoint { timestamp, kind }
    }

    fn alternating(timestamps: &[f64]) -> Vec<TurningPoint> {
        timestamps
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let kind = if i % 2 == 0 {
                    TurningKind::Peak
                } else {
                    TurningKind::Valley
                };
                tp(t, kind)
            })
            .collect()
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sine(t: f64, period: f64) -> f64 {
        0.5 + 0.25 * (2.0 * PI * t / period).sin()
    }

    #[test]
    fn test_predict_formula() {
        let points = alternating(&[1.0, 1.5, 2.0, 2.5]);
        let p = predict(&points, 2.75, 8, 1.0).unwrap();

        assert_abs_diff_eq!(p.period, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.phase, 2.25, epsilon = 1e-12);
        assert_abs_diff_eq!(p.eta, 2.75 + 1.75, epsilon = 1e-12);
        assert_eq!(p.turning_points, 4);
    }

    #[test]
    fn test_single_point_uses_default_period() {
        let points = alternating(&[1.0]);
        let p = predict(&points, 1.2, 8, 0.8).unwrap();
        assert_abs_diff_eq!(p.period, 0.8);
        assert_abs_diff_eq!(p.phase, 0.5 + 0.2 / 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_non_alternating_rejected() {
        let points = vec![
            tp(1.0, TurningKind::Peak),
            tp(1.5, TurningKind::Valley),
            tp(1.7, TurningKind::Valley),
            tp(2.0, TurningKind::Peak),
        ];
        assert!(predict(&points, 2.1, 8, 1.0).is_none());

        let doubled = vec![tp(1.0, TurningKind::Peak), tp(1.4, TurningKind::Peak)];
        assert!(predict(&doubled, 1.5, 8, 1.0).is_none());
    }

    #[test]
    fn test_too_many_points_rejected() {
        let times: Vec<f64> = (0..9).map(|i| i as f64 * 0.25).collect();
        let points = alternating(&times);
        assert!(predict(&points, 2.1, 8, 1.0).is_none());
        assert!(predict(&points[..8], 1.9, 8, 1.0).is_some());
    }

    #[test]
    fn test_stale_motion_rejected() {
        let points = alternating(&[1.0, 1.5]);
        assert!(predict(&points, 2.0, 8, 1.0).is_some());
        assert!(predict(&points, 2.6, 8, 1.0).is_none());
        assert!(predict(&[], 2.0, 8, 1.0).is_none());
    }

    #[test]
    fn test_phase_at_extrapolates() {
        let p = MotionPrediction {
            period: 2.0,
            phase: 1.0,
            eta: 16.0,
            computed_at: 10.0,
            turning_points: 2,
        };
        assert_abs_diff_eq!(p.phase_at(11.0), 1.5);
        assert_abs_diff_eq!(p.phase_at(9.0), 1.0);
        assert_abs_diff_eq!(p.time_of_phase(4.0), 16.0);
    }

    #[test]
    fn test_too_few_samples_gives_no_prediction() {
        let (mut analyzer, clock) = analyzer();
        for i in 0..4 {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(0.5));
            analyzer.recompute(t);
        }
        assert!(analyzer.prediction().is_none());
        assert!(analyzer.turning_points().is_empty());
    }

    #[test]
    fn test_sine_period_converges() {
        init_logging();
        for period in [1.5, 2.0] {
            let (mut analyzer, clock) = analyzer();
            let mut checked = 0;

            for i in 0..(8.0 * FPS) as usize {
                let t = i as f64 / FPS;
                clock.set(t);
                analyzer.add_sample(t, Some(sine(t, period)));

                if let Some(p) = analyzer.prediction() {
                    if analyzer.turning_points().len() >= 4 {
                        assert_abs_diff_eq!(p.period, period, epsilon = 0.1);
                        checked += 1;
                    }
                }
            }
            assert!(checked > 10, "period {period}: only {checked} checks");
        }
    }

    #[test]
    fn test_noisy_sine_period_converges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let noise = Normal::new(0.0, 0.01).unwrap();
        let (mut analyzer, clock) = analyzer();
        let period = 1.5;
        let mut checked = 0;

        for i in 0..(8.0 * FPS) as usize {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(sine(t, period) + noise.sample(&mut rng)));

            if let Some(p) = analyzer.prediction() {
                if analyzer.turning_points().len() >= 4 {
                    assert_abs_diff_eq!(p.period, period, epsilon = 0.15);
                    checked += 1;
                }
            }
        }
        assert!(checked > 10);
    }

    #[test]
    fn test_phase_monotonic_while_alive() {
        let (mut analyzer, clock) = analyzer();
        let mut previous: Option<(f64, usize)> = None;

        for i in 0..(8.0 * FPS) as usize {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(sine(t, 1.2)));

            let current = analyzer
                .prediction()
                .map(|p| (p.phase_at(t), p.turning_points));
            if let (Some((prev_phase, prev_count)), Some((phase, count))) = (previous, current) {
                if count >= prev_count {
                    assert!(
                        phase >= prev_phase,
                        "phase fell from {prev_phase} to {phase} at {t}"
                    );
                }
            }
            previous = current;
        }
    }

    #[test]
    fn test_prediction_cleared_when_motion_stops() {
        let (mut analyzer, clock) = analyzer();
        let mut seen = false;

        for i in 0..(3.0 * FPS) as usize {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(sine(t, 1.0)));
            seen |= analyzer.prediction().is_some();
        }
        assert!(seen);

        for i in (3.0 * FPS) as usize..(4.5 * FPS) as usize {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(0.5));
        }
        assert!(analyzer.prediction().is_none());
    }

    #[test]
    fn test_duplicate_samples_do_not_change_history() {
        let (mut analyzer, clock) = analyzer();
        for i in 0..10 {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(0.5));
        }
        let before: Vec<_> = analyzer.history().iter().copied().collect();
        let newest = analyzer.history().newest_timestamp().unwrap();

        assert!(!analyzer.add_sample(newest, Some(0.9)));
        assert!(!analyzer.add_sample(newest - 0.1, None));

        let after: Vec<_> = analyzer.history().iter().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_recompute_rate_limited() {
        let (mut analyzer, clock) = analyzer();
        analyzer.add_sample(0.0, Some(sine(0.0, 1.0)));

        // a full window of motion arrives while the clock stays inside the
        // recompute interval
        clock.set(0.1);
        for i in 1..(3.0 * FPS) as usize {
            let t = i as f64 / FPS;
            analyzer.add_sample(t, Some(sine(t, 1.0)));
        }
        assert!(analyzer.prediction().is_none());
        assert!(analyzer.turning_points().is_empty());

        clock.set(3.0);
        analyzer.add_sample(3.0, Some(sine(3.0, 1.0)));
        assert!(analyzer.prediction().is_some());
    }

    #[test]
    fn test_reset() {
        let (mut analyzer, clock) = analyzer();
        for i in 0..(3.0 * FPS) as usize {
            let t = i as f64 / FPS;
            clock.set(t);
            analyzer.add_sample(t, Some(sine(t, 1.0)));
        }
        analyzer.reset();
        assert!(analyzer.history().is_empty());
        assert!(analyzer.prediction().is_none());
        assert!(analyzer.phase_now().is_none());
    }
}
