//! Monotonic time sources.
//!
//! Everything time-gated in the bot (turning-point recomputation, tracker
//! reinitialisation, round timeouts) reads seconds from a [`Clock`] rather
//! than the wall clock, so tests can drive time by hand with [`ManualClock`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// A monotonic source of seconds.
pub trait Clock {
    /// Seconds since an arbitrary fixed origin. Never decreases.
    fn now(&self) -> f64;
}

/// Clock backed by [`Instant`], counting from the moment it was created.
///
/// Clones share the same origin.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for simulations and tests.
///
/// Clones share the same underlying time, so one handle can be given to the
/// estimator, another to the controller, and a third kept by the test to
/// advance both.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Create a clock reading `start` seconds.
    pub fn starting_at(start: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `secs`. Negative steps are ignored.
    pub fn advance(&self, secs: f64) {
        if secs > 0.0 {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner) += secs;
        }
    }

    /// Jump to `secs` if it is not earlier than the current reading.
    pub fn set(&self, secs: f64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if secs > *now {
            *now = secs;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
