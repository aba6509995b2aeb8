//! Two-state (position, velocity) Kalman smoother.
//!
//! Constant-velocity model with a variable time step:
//!
//! ```text
//! F = | 1  dt |     H = | 1  0 |     Q = q * I     R = r
//!     | 0   1 |
//! ```
//!
//! The first measurement seeds the state at `[z, 0]` with covariance
//! `initial_covariance * I`; every later measurement runs one predict step
//! over `dt` followed by one correct step.

use nalgebra::{Matrix1x2, Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;

/// Smoothed estimate attached to a history sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilteredState {
    pub position: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone)]
pub struct StateFilter {
    state: Option<Vector2<f64>>,
    covariance: Matrix2<f64>,
    process_noise: f64,
    measurement_noise: f64,
    initial_covariance: f64,
}

impl StateFilter {
    pub fn new(process_noise: f64, measurement_noise: f64, initial_covariance: f64) -> Self {
        Self {
            state: None,
            covariance: Matrix2::identity() * initial_covariance,
            process_noise,
            measurement_noise,
            initial_covariance,
        }
    }

    pub fn from_config(config: &MotionConfig) -> Self {
        Self::new(
            config.process_noise,
            config.measurement_noise,
            config.initial_covariance,
        )
    }

    /// Current estimate, `None` before the first measurement.
    pub fn estimate(&self) -> Option<FilteredState> {
        self.state.map(|x| FilteredState {
            position: x[0],
            velocity: x[1],
        })
    }

    pub fn covariance(&self) -> &Matrix2<f64> {
        &self.covariance
    }

    /// Fold in a measurement taken `dt` seconds after the previous one.
    ///
    /// Negative `dt` is treated as zero.
    pub fn step(&mut self, dt: f64, measurement: f64) -> FilteredState {
        let Some(x) = self.state else {
            let seeded = Vector2::new(measurement, 0.0);
            self.state = Some(seeded);
            self.covariance = Matrix2::identity() * self.initial_covariance;
            return FilteredState {
                position: measurement,
                velocity: 0.0,
            };
        };

        let dt = dt.max(0.0);
        let f = Matrix2::new(1.0, dt, 0.0, 1.0);
        let h = Matrix1x2::new(1.0, 0.0);
        let q = Matrix2::identity() * self.process_noise;

        // predict
        let x_prior = f * x;
        let p_prior = f * self.covariance * f.transpose() + q;

        // correct
        let innovation = measurement - (h * x_prior)[0];
        let s = (h * p_prior * h.transpose())[0] + self.measurement_noise;
        let gain: Vector2<f64> = p_prior * h.transpose() / s;

        let x_post = x_prior + gain * innovation;
        self.covariance = (Matrix2::identity() - gain * h) * p_prior;
        self.state = Some(x_post);

        FilteredState {
            position: x_post[0],
            velocity: x_post[1],
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
        self.covariance = Matrix2::identity() * self.initial_covariance;
    }
}
