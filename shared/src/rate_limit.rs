//! Timestamp-gated rate limiting.
//!
//! Expensive per-frame work (turning-point detection, tracker reseeding) is
//! skipped rather than delayed: the caller asks the gate whether enough time
//! has passed since the work was last performed and simply does nothing on
//! ticks where it has not.

/// Remembers when an operation was last performed.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiter {
    min_interval: f64,
    last_performed: Option<f64>,
}

impl RateLimiter {
    /// Gate allowing the operation at most once per `min_interval` seconds.
    ///
    /// The first call is always allowed.
    pub fn new(min_interval: f64) -> Self {
        Self {
            min_interval: min_interval.max(0.0),
            last_performed: None,
        }
    }

    /// Minimum spacing between performances, in seconds.
    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }

    /// When the operation last ran, if ever.
    pub fn last_performed(&self) -> Option<f64> {
        self.last_performed
    }

    /// Whether the operation may run at `now` (does not record anything).
    pub fn is_ready(&self, now: f64) -> bool {
        match self.last_performed {
            None => true,
            Some(last) => now - last >= self.min_interval,
        }
    }

    /// If ready at `now`, record a performance and return true.
    pub fn try_acquire(&mut self, now: f64) -> bool {
        if self.is_ready(now) {
            self.last_performed = Some(now);
            true
        } else {
            false
        }
    }

    /// Forget the last performance so the next check passes.
    pub fn reset(&mut self) {
        self.last_performed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_allowed() {
        let mut gate = RateLimiter::new(0.2);
        assert!(gate.is_ready(0.0));
        assert!(gate.try_acquire(0.0));
        assert_eq!(gate.last_performed(), Some(0.0));
    }

    #[test]
    fn test_calls_within_interval_skipped() {
        let mut gate = RateLimiter::new(0.2);
        assert!(gate.try_acquire(1.0));
        assert!(!gate.try_acquire(1.1));
        assert!(!gate.try_acquire(1.19));
        // skipped calls do not push the window forward
        assert_eq!(gate.last_performed(), Some(1.0));
        assert!(gate.try_acquire(1.25));
        assert_eq!(gate.last_performed(), Some(1.25));
    }

    #[test]
    fn test_reset() {
        let mut gate = RateLimiter::new(10.0);
        assert!(gate.try_acquire(0.0));
        assert!(!gate.is_ready(1.0));
        gate.reset();
        assert!(gate.try_acquire(1.0));
    }

    #[test]
    fn test_negative_interval_clamped() {
        let gate = RateLimiter::new(-1.0);
        assert_eq!(gate.min_interval(), 0.0);
    }
}
