//! Source of the hand's vertical position.

/// Per-frame provider of the tracked hand height.
///
/// Heights are normalised so that larger means higher: a raised hand reads
/// near 1, a lowered hand near 0. `None` means the hand was not found in the
/// current frame.
pub trait PositionSource {
    fn current_height(&mut self) -> Option<f64>;
}

/// Position source replaying a fixed list of readings, one per call.
///
/// Returns `None` once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ReplayPosition {
    readings: std::collections::VecDeque<Option<f64>>,
}

impl ReplayPosition {
    pub fn new(readings: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl PositionSource for ReplayPosition {
    fn current_height(&mut self) -> Option<f64> {
        self.readings.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_in_order() {
        let mut source = ReplayPosition::new([Some(0.2), None, Some(0.7)]);
        assert_eq!(source.remaining(), 3);
        assert_eq!(source.current_height(), Some(0.2));
        assert_eq!(source.current_height(), None);
        assert_eq!(source.current_height(), Some(0.7));
        assert_eq!(source.current_height(), None);
        assert_eq!(source.remaining(), 0);
    }
}
