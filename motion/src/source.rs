//! Choosing where the hand height comes from.
//!
//! The hand detector is authoritative but misses frames; an optical region
//! tracker follows the hand in between. Both tracker operations are
//! expensive, so re-seeding and polling are each rate limited and the last
//! tracked height is reused on skipped frames.

use shared::clock::Clock;
use shared::position::PositionSource;
use shared::rate_limit::RateLimiter;

/// Fallback tracker seeded from detector hits.
pub trait RegionTracker {
    /// Restart tracking at the given height.
    fn init(&mut self, height: f64);

    /// Advance one frame. `None` when the tracker lost the region.
    fn update(&mut self) -> Option<f64>;

    fn stop(&mut self);
}

/// Position source preferring a detector and falling back to a tracker.
pub struct HeightSelector<D, T, C> {
    detector: D,
    tracker: T,
    clock: C,
    reinit_gate: RateLimiter,
    update_gate: RateLimiter,
    tracking: bool,
    tracked_height: Option<f64>,
}

impl<D: PositionSource, T: RegionTracker, C: Clock> HeightSelector<D, T, C> {
    pub fn new(
        detector: D,
        tracker: T,
        clock: C,
        min_reinit_interval_secs: f64,
        min_update_interval_secs: f64,
    ) -> Self {
        Self {
            detector,
            tracker,
            clock,
            reinit_gate: RateLimiter::new(min_reinit_interval_secs),
            update_gate: RateLimiter::new(min_update_interval_secs),
            tracking: false,
            tracked_height: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Stop the tracker and forget its last height.
    pub fn stop(&mut self) {
        self.tracker.stop();
        self.tracking = false;
        self.tracked_height = None;
    }
}

impl<D: PositionSource, T: RegionTracker, C: Clock> PositionSource for HeightSelector<D, T, C> {
    fn current_height(&mut self) -> Option<f64> {
        let now = self.clock.now();

        if let Some(height) = self.detector.current_height() {
            self.tracked_height = Some(height);
            if self.reinit_gate.try_acquire(now) {
                log::trace!("Re-seeding tracker at height {height:.3}");
                self.tracker.init(height);
                self.tracking = true;
            }
            return Some(height);
        }

        if !self.tracking {
            return None;
        }

        if self.update_gate.try_acquire(now) {
            self.tracked_height = self.tracker.update();
            if self.tracked_height.is_none() {
                log::debug!("Tracker lost the hand");
            }
        }
        self.tracked_height
    }
}
