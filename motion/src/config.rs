//! Tunables for the motion estimator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the filtered window is put onto a uniform time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Piecewise-linear interpolation at the grid timestamps.
    #[default]
    Linear,
    /// FFT zero-padding/truncation. Assumes the window is periodic, so it
    /// rings near the edges.
    Spectral,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },
}

/// Configuration for [`crate::MotionAnalyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Trailing window searched for turning points (seconds)
    pub lookback_secs: f64,
    /// Fewer filtered samples than this in the window means no prediction
    pub min_window_points: usize,
    /// Number of uniformly spaced points the window is resampled onto
    pub resample_count: usize,
    pub resample_method: ResampleMethod,
    /// Minimum prominence of a peak or valley, in normalised height units
    pub prominence: f64,
    /// More turning points than this in the window means the shoot was missed
    pub max_turning_points: usize,
    /// Period assumed when only one turning point has been seen (seconds)
    pub default_period_secs: f64,
    /// Minimum spacing between turning-point recomputations (seconds)
    pub recompute_interval_secs: f64,
    /// Number of samples kept in history
    pub history_capacity: usize,
    /// Kalman process noise per step (applied to both states)
    pub process_noise: f64,
    /// Kalman measurement noise
    pub measurement_noise: f64,
    /// Initial state covariance on the first measurement
    pub initial_covariance: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            lookback_secs: 5.0,
            min_window_points: 5,
            resample_count: 100,
            resample_method: ResampleMethod::Linear,
            prominence: 0.3,
            max_turning_points: 8,
            default_period_secs: 1.0,
            recompute_interval_secs: 0.2,
            history_capacity: 200,
            process_noise: 0.05,
            measurement_noise: 0.05,
            initial_covariance: 1.0,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), MotionConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MotionConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), MotionConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MotionConfigError::Negative { name, value })
    }
}

fn at_least(name: &'static str, min: usize, value: usize) -> Result<(), MotionConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(MotionConfigError::TooSmall { name, min, value })
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), MotionConfigError> {
        positive("lookback_secs", self.lookback_secs)?;
        positive("default_period_secs", self.default_period_secs)?;
        positive("measurement_noise", self.measurement_noise)?;
        positive("initial_covariance", self.initial_covariance)?;
        non_negative("prominence", self.prominence)?;
        non_negative("recompute_interval_secs", self.recompute_interval_secs)?;
        non_negative("process_noise", self.process_noise)?;
        at_least("min_window_points", 2, self.min_window_points)?;
        at_least("resample_count", 3, self.resample_count)?;
        at_least("max_turning_points", 1, self.max_turning_points)?;
        at_least("history_capacity", self.min_window_points, self.history_capacity)?;
        Ok(())
    }
}
