//! Source of the player's classified gesture.
//!
//! The classifier itself lives outside the bot; it publishes its newest
//! reading into a [`LatestGesture`] slot which the game controller polls.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::moves::Move;

/// Anything that can report the most recently recognised gesture.
pub trait GestureSource {
    /// Newest classified gesture, `None` if nothing has been seen yet.
    fn latest_gesture(&self) -> Option<Move>;

    /// Classifier score attached to the newest gesture, if it reported one.
    fn latest_confidence(&self) -> Option<f32>;
}

/// A single classifier reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureReading {
    pub gesture: Move,
    pub confidence: Option<f32>,
}

/// Shared single-slot mailbox holding the newest classifier reading.
///
/// Clones share the slot: the classifier thread publishes through one handle
/// while the controller reads through another.
#[derive(Debug, Clone, Default)]
pub struct LatestGesture {
    slot: Arc<Mutex<Option<GestureReading>>>,
}

impl LatestGesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored reading.
    pub fn publish(&self, gesture: Move, confidence: Option<f32>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(GestureReading {
            gesture,
            confidence,
        });
    }

    /// Publish a reading from a classifier category name.
    pub fn publish_label(&self, label: &str, confidence: Option<f32>) {
        self.publish(Move::from_label(label), confidence);
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn reading(&self) -> Option<GestureReading> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GestureSource for LatestGesture {
    fn latest_gesture(&self) -> Option<Move> {
        self.reading().map(|r| r.gesture)
    }

    fn latest_confidence(&self) -> Option<f32> {
        self.reading().and_then(|r| r.confidence)
    }
}
