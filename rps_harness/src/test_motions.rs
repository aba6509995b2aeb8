//! Synthetic hand-height profiles.
//!
//! Heights follow the [`shared::position::PositionSource`] convention:
//! larger is higher, nominally within [0, 1].

use std::f64::consts::PI;

/// Hand height as a function of time.
pub trait HandMotion: Send + Sync {
    /// Height at `t` seconds, `None` if the hand is out of view.
    fn height_at(&self, t: f64) -> Option<f64>;

    fn name(&self) -> &str;
}

/// A player chanting "rock, paper, scissors, shoot".
///
/// The hand rests low, is raised to the top of the bob, bobs for
/// `cycles` periods starting from the top and then holds low at the shoot.
/// With the default 3.5 cycles the shoot lands on the eighth turning point.
#[derive(Debug, Clone, PartialEq)]
pub struct ChantMotion {
    pub period: f64,
    /// When the hand starts rising from rest (seconds)
    pub raise_start: f64,
    /// Time taken to raise the hand (seconds)
    pub raise_secs: f64,
    pub low: f64,
    pub high: f64,
    pub cycles: f64,
}

impl ChantMotion {
    pub fn new(period: f64) -> Self {
        Self {
            period,
            raise_start: 0.5,
            raise_secs: 0.3,
            low: 0.3,
            high: 0.8,
            cycles: 3.5,
        }
    }

    /// Time the bobbing starts, at the top of the first bob.
    pub fn bob_start(&self) -> f64 {
        self.raise_start + self.raise_secs
    }

    /// Time the hand reaches its final low position.
    pub fn shoot_time(&self) -> f64 {
        self.bob_start() + self.cycles * self.period
    }
}

impl HandMotion for ChantMotion {
    fn height_at(&self, t: f64) -> Option<f64> {
        let mid = (self.low + self.high) / 2.0;
        let amplitude = (self.high - self.low) / 2.0;

        let height = if t < self.raise_start {
            self.low
        } else if t < self.bob_start() {
            let progress = (t - self.raise_start) / self.raise_secs;
            self.low + (self.high - self.low) * (1.0 - (PI * progress).cos()) / 2.0
        } else if t < self.shoot_time() {
            mid + amplitude * (2.0 * PI * (t - self.bob_start()) / self.period).cos()
        } else {
            self.low
        };
        Some(height)
    }

    fn name(&self) -> &str {
        "chant"
    }
}

/// Endless sinusoidal bobbing.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyBob {
    pub period: f64,
    pub center: f64,
    pub amplitude: f64,
}

impl SteadyBob {
    pub fn new(period: f64) -> Self {
        Self {
            period,
            center: 0.55,
            amplitude: 0.25,
        }
    }
}

impl HandMotion for SteadyBob {
    fn height_at(&self, t: f64) -> Option<f64> {
        Some(self.center + self.amplitude * (2.0 * PI * t / self.period).cos())
    }

    fn name(&self) -> &str {
        "steady"
    }
}

/// A hand held at a fixed height.
#[derive(Debug, Clone, PartialEq)]
pub struct StillHand {
    pub height: f64,
}

impl HandMotion for StillHand {
    fn height_at(&self, _t: f64) -> Option<f64> {
        Some(self.height)
    }

    fn name(&self) -> &str {
        "still"
    }
}

/// Lookup of motions by name, for command line tools.
pub struct TestMotions;

impl TestMotions {
    pub const NAMES: [&'static str; 3] = ["chant", "steady", "still"];

    /// Build the named motion with the given bob period.
    pub fn get_motion(name: &str, period: f64) -> Option<Box<dyn HandMotion>> {
        match name {
            "chant" => Some(Box::new(ChantMotion::new(period))),
            "steady" => Some(Box::new(SteadyBob::new(period))),
            "still" => Some(Box::new(StillHand { height: 0.5 })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_chant_profile() {
        let chant = ChantMotion::new(0.8);
        assert_relative_eq!(chant.shoot_time(), 3.6, epsilon = 1e-12);

        assert_eq!(chant.height_at(0.0), Some(0.3));
        assert_relative_eq!(chant.height_at(chant.bob_start()).unwrap(), 0.8, epsilon = 1e-12);
        // first valley half a period into the bob
        assert_relative_eq!(
            chant.height_at(chant.bob_start() + 0.4).unwrap(),
            0.3,
            epsilon = 1e-12
        );
        assert_eq!(chant.height_at(10.0), Some(0.3));
    }

    #[test]
    fn test_raise_is_continuous() {
        let chant = ChantMotion::new(1.0);
        let before = chant.height_at(chant.bob_start() - 1e-6).unwrap();
        let after = chant.height_at(chant.bob_start()).unwrap();
        assert!((before - after).abs() < 1e-3);
    }

    #[test]
    fn test_lookup() {
        for name in TestMotions::NAMES {
            let motion = TestMotions::get_motion(name, 1.0).unwrap();
            assert_eq!(motion.name(), name);
        }
        assert!(TestMotions::get_motion("wave", 1.0).is_none());
    }
}
