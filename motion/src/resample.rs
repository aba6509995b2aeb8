//! Uniform-grid resampling of an irregularly sampled signal.
//!
//! Both methods return values on `count` evenly spaced timestamps spanning
//! the first to the last input timestamp inclusive.

use ndarray::Array1;
use num_complex::Complex;
use rustfft::FftPlanner;
use thiserror::Error;

use crate::config::ResampleMethod;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResampleError {
    #[error("Need at least 2 samples to resample, got {0}")]
    InsufficientData(usize),
    #[error("Timestamps and values must have the same length ({0} vs {1})")]
    MismatchedLengths(usize, usize),
    #[error("Timestamps must be strictly increasing")]
    UnsortedData,
    #[error("Resample count must be at least 2, got {0}")]
    InvalidCount(usize),
}

/// A signal on a uniform time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSeries {
    pub timestamps: Array1<f64>,
    pub values: Array1<f64>,
}

impl UniformSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn check_input(timestamps: &[f64], values: &[f64], count: usize) -> Result<(), ResampleError> {
    if timestamps.len() != values.len() {
        return Err(ResampleError::MismatchedLengths(
            timestamps.len(),
            values.len(),
        ));
    }
    if timestamps.len() < 2 {
        return Err(ResampleError::InsufficientData(timestamps.len()));
    }
    if count < 2 {
        return Err(ResampleError::InvalidCount(count));
    }
    if timestamps.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ResampleError::UnsortedData);
    }
    Ok(())
}

/// Resample with the given method.
pub fn resample(
    method: ResampleMethod,
    timestamps: &[f64],
    values: &[f64],
    count: usize,
) -> Result<UniformSeries, ResampleError> {
    check_input(timestamps, values, count)?;

    let grid = Array1::linspace(timestamps[0], timestamps[timestamps.len() - 1], count);
    let resampled = match method {
        ResampleMethod::Linear => grid.mapv(|t| interp_sorted(t, timestamps, values)),
        ResampleMethod::Spectral => Array1::from(fourier_resample(values, count)),
    };

    Ok(UniformSeries {
        timestamps: grid,
        values: resampled,
    })
}

/// Linear interpolation on sorted `xs`, clamping outside the range.
fn interp_sorted(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let idx = xs.partition_point(|&probe| probe < x);
    if idx == 0 {
        return ys[0];
    }
    if idx >= xs.len() {
        return ys[ys.len() - 1];
    }
    if xs[idx] == x {
        return ys[idx];
    }

    let (x1, x2) = (xs[idx - 1], xs[idx]);
    let (y1, y2) = (ys[idx - 1], ys[idx]);
    let t = (x - x1) / (x2 - x1);
    y1 + t * (y2 - y1)
}

/// Resample `values` to `num` points by truncating or zero-padding the
/// spectrum.
///
/// The input is treated as one period of a periodic signal; output sample
/// `m` lies at fractional input index `m * len / num`. The even-length
/// Nyquist bin is split or folded so a real input gives a real output.
pub fn fourier_resample(values: &[f64], num: usize) -> Vec<f64> {
    let nx = values.len();
    if nx == 0 || num == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();

    let mut spectrum: Vec<Complex<f64>> = values.iter().map(|&v| Complex::new(v, 0.0)).collect();
    planner.plan_fft_forward(nx).process(&mut spectrum);

    // Non-negative half of the output spectrum
    let n = num.min(nx);
    let mut half = vec![Complex::new(0.0, 0.0); num / 2 + 1];
    let keep = (n / 2 + 1).min(half.len());
    half[..keep].copy_from_slice(&spectrum[..keep]);
    if n % 2 == 0 {
        if num < nx {
            half[n / 2] *= 2.0;
        } else if nx < num {
            half[n / 2] *= 0.5;
        }
    }

    // Hermitian extension to the full spectrum
    let mut full = vec![Complex::new(0.0, 0.0); num];
    full[0] = half[0];
    for k in 1..=num / 2 {
        full[k] = half[k];
        if num - k != k {
            full[num - k] = half[k].conj();
        }
    }

    planner.plan_fft_inverse(num).process(&mut full);

    // rustfft leaves the inverse unnormalised: 1/num, then scale by num/nx
    let scale = 1.0 / nx as f64;
    full.iter().map(|c| c.re * scale).collect()
}
