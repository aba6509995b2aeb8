//! Position source sampling a synthetic motion on a shared clock.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use shared::clock::Clock;
use shared::position::PositionSource;

use crate::session::SessionError;
use crate::test_motions::HandMotion;

/// Stand-in for the camera-side hand tracker.
///
/// Reads `motion` at the clock's current time and optionally adds Gaussian
/// measurement noise and random dropouts. Heights are clamped to [0, 1].
pub struct SimulatedPosition<C> {
    motion: Box<dyn HandMotion>,
    clock: C,
    noise: Option<Normal<f64>>,
    dropout_rate: f64,
    rng: ChaCha8Rng,
}

impl<C: Clock> SimulatedPosition<C> {
    /// Noise-free source.
    pub fn new(motion: Box<dyn HandMotion>, clock: C) -> Self {
        Self {
            motion,
            clock,
            noise: None,
            dropout_rate: 0.0,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Add zero-mean Gaussian noise with standard deviation `sigma`.
    ///
    /// `sigma` must be finite and non-negative; zero disables the noise.
    pub fn with_noise(mut self, sigma: f64, seed: u64) -> Result<Self, SessionError> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(SessionError::Noise(sigma));
        }
        self.noise = if sigma == 0.0 {
            None
        } else {
            Some(Normal::new(0.0, sigma).map_err(|_| SessionError::Noise(sigma))?)
        };
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(self)
    }

    /// Drop each reading with probability `rate`.
    pub fn with_dropouts(mut self, rate: f64) -> Self {
        self.dropout_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn motion(&self) -> &dyn HandMotion {
        self.motion.as_ref()
    }
}

impl<C: Clock> PositionSource for SimulatedPosition<C> {
    fn current_height(&mut self) -> Option<f64> {
        let height = self.motion.height_at(self.clock.now())?;

        if self.dropout_rate > 0.0 && self.rng.random::<f64>() < self.dropout_rate {
            return None;
        }

        let noisy = match &self.noise {
            Some(noise) => height + noise.sample(&mut self.rng),
            None => height,
        };
        Some(noisy.clamp(0.0, 1.0))
    }
}
