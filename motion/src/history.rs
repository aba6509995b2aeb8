//! Bounded, time-ordered store of raw and filtered height samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::filter::{FilteredState, StateFilter};

/// One stored sample.
///
/// `filtered` is `None` exactly when `measurement` is: the hand was not seen
/// at `timestamp`, but the gap is kept so window queries stay time-accurate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: f64,
    pub measurement: Option<f64>,
    pub filtered: Option<FilteredState>,
}

/// Append-only ring of samples, smoothed on insertion.
///
/// Entries are never modified after insertion; the oldest is evicted once
/// `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    filter: StateFilter,
    last_measured_at: Option<f64>,
}

impl History {
    /// # Panics
    /// Panics if capacity is 0.
    pub fn new(capacity: usize, filter: StateFilter) -> Self {
        assert!(capacity > 0, "History capacity must be > 0");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            filter,
            last_measured_at: None,
        }
    }

    /// Append a sample.
    ///
    /// Returns false, leaving the history untouched, if `timestamp` is not
    /// strictly newer than the newest stored sample. A present measurement is
    /// run through the filter with `dt` measured from the previous present
    /// measurement, so absent frames in between do not reset `dt`.
    /// Non-finite measurements are stored as absent.
    pub fn add_sample(&mut self, timestamp: f64, measurement: Option<f64>) -> bool {
        if !timestamp.is_finite() {
            log::warn!("Dropping sample with non-finite timestamp {timestamp}");
            return false;
        }
        if let Some(newest) = self.newest_timestamp() {
            if timestamp <= newest {
                log::trace!("Dropping out-of-order sample at {timestamp} (newest {newest})");
                return false;
            }
        }

        let measurement = measurement.filter(|m| {
            let ok = m.is_finite();
            if !ok {
                log::warn!("Treating non-finite measurement at {timestamp} as absent");
            }
            ok
        });

        let filtered = measurement.map(|z| {
            let dt = self
                .last_measured_at
                .map(|last| timestamp - last)
                .unwrap_or(0.0);
            self.last_measured_at = Some(timestamp);
            self.filter.step(dt, z)
        });

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            timestamp,
            measurement,
            filtered,
        });
        true
    }

    /// Filtered samples with `timestamp >= now - window_secs`, oldest first.
    ///
    /// Entries without a filtered state are skipped. Each call walks the
    /// buffer afresh.
    pub fn filtered_since(
        &self,
        now: f64,
        window_secs: f64,
    ) -> impl Iterator<Item = (f64, FilteredState)> + '_ {
        let cutoff = now - window_secs;
        let start = self.entries.partition_point(|e| e.timestamp < cutoff);
        self.entries
            .range(start..)
            .filter_map(|e| e.filtered.map(|f| (e.timestamp, f)))
    }

    pub fn newest_timestamp(&self) -> Option<f64> {
        self.entries.back().map(|e| e.timestamp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over every stored entry, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Forget every sample and the filter state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.filter.reset();
        self.last_measured_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn history(capacity: usize) -> History {
        History::new(capacity, StateFilter::new(0.05, 0.05, 1.0))
    }

    #[test]
    fn test_absent_measurement_keeps_timestamp() {
        let mut h = history(10);
        assert!(h.add_sample(0.0, Some(0.5)));
        assert!(h.add_sample(0.1, None));
        assert!(h.add_sample(0.2, Some(0.6)));

        let entries: Vec<_> = h.iter().copied().collect();
        assert_eq!(entries.len(), 3);
        assert!(entries[1].filtered.is_none());
        assert_abs_diff_eq!(entries[1].timestamp, 0.1);

        let window: Vec<_> = h.filtered_since(0.2, 10.0).map(|(ts, _)| ts).collect();
        assert_eq!(window, vec![0.0, 0.2]);
    }

    #[test]
    fn test_out_of_order_samples_ignored() {
        let mut h = history(10);
        h.add_sample(1.0, Some(0.5));
        h.add_sample(2.0, Some(0.7));
        let before: Vec<_> = h.iter().copied().collect();

        assert!(!h.add_sample(2.0, Some(0.1)));
        assert!(!h.add_sample(1.5, Some(0.9)));
        assert!(!h.add_sample(0.0, None));

        let after: Vec<_> = h.iter().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = history(3);
        for i in 0..5 {
            h.add_sample(i as f64, Some(0.5));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.iter().next().map(|e| e.timestamp), Some(2.0));
        assert_eq!(h.newest_timestamp(), Some(4.0));
    }

    #[test]
    fn test_filtered_since_window_property() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut h = history(200);

        let mut ts = 0.0;
        for _ in 0..150 {
            ts += rng.random_range(0.01..0.08);
            let measurement = if rng.random_bool(0.2) {
                None
            } else {
                Some(rng.random_range(0.0..1.0))
            };
            h.add_sample(ts, measurement);
        }

        for window in [0.0, 0.5, 1.3, 4.0, 100.0] {
            let got: Vec<f64> = h.filtered_since(ts, window).map(|(t, _)| t).collect();
            let expected: Vec<f64> = h
                .iter()
                .filter(|e| e.timestamp >= ts - window && e.filtered.is_some())
                .map(|e| e.timestamp)
                .collect();
            assert_eq!(got, expected, "window {window}");
            assert!(got.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_gap_extrapolates_over_full_dt() {
        let mut h = history(10);
        h.add_sample(0.0, Some(0.0));
        h.add_sample(0.1, Some(0.1));
        h.add_sample(0.2, None);
        h.add_sample(0.3, Some(0.3));
        let last = h.iter().last().and_then(|e| e.filtered).unwrap();
        assert!(last.position > 0.2);
    }

    #[test]
    fn test_absent_frames_do_not_reset_dt() {
        let mut gapped = history(10);
        let mut direct = history(10);
        for (t, z) in [(0.0, 0.0), (0.1, 0.1)] {
            gapped.add_sample(t, Some(z));
            direct.add_sample(t, Some(z));
        }
        gapped.add_sample(0.2, None);
        gapped.add_sample(0.3, Some(0.3));
        direct.add_sample(0.3, Some(0.3));

        let a = gapped.iter().last().and_then(|e| e.filtered).unwrap();
        let b = direct.iter().last().and_then(|e| e.filtered).unwrap();
        assert_abs_diff_eq!(a.position, b.position, epsilon = 1e-12);
        assert_abs_diff_eq!(a.velocity, b.velocity, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_measurement_stored_as_absent() {
        let mut h = history(10);
        assert!(h.add_sample(0.0, Some(f64::NAN)));
        let entry = h.iter().next().copied().unwrap();
        assert!(entry.measurement.is_none());
        assert!(entry.filtered.is_none());
        assert!(!h.add_sample(f64::INFINITY, Some(0.5)));
    }

    #[test]
    fn test_clear() {
        let mut h = history(10);
        h.add_sample(5.0, Some(0.5));
        h.clear();
        assert!(h.is_empty());
        // older timestamps are accepted again after a clear
        assert!(h.add_sample(1.0, Some(0.5)));
    }
}
