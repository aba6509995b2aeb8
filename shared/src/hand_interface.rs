//! Actuator interface for the robotic hand.
//!
//! The hand exposes three primitive, fire-and-forget commands: extend a
//! finger, retract a finger, and trigger the queued motion. Poses are
//! compositions of those primitives and come as provided methods, so a
//! driver only has to implement the primitives.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::moves::Move;

/// Motor-driven fingers, in motor order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// All fingers, in motor order.
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// One-based motor channel driving this finger.
    pub fn motor_id(self) -> u8 {
        match self {
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Ring => 3,
            Finger::Pinky => 4,
        }
    }

    /// Finger driven by a one-based motor channel.
    pub fn from_motor_id(id: u8) -> Option<Finger> {
        Finger::ALL.into_iter().find(|f| f.motor_id() == id)
    }
}

/// Fire-and-forget control of the hand.
///
/// No method reports success: commands are best-effort writes and the game
/// never waits on the hardware.
pub trait HandActuator {
    /// Queue a finger to open fully.
    fn extend(&mut self, finger: Finger);

    /// Queue a finger to curl fully.
    fn retract(&mut self, finger: Finger);

    /// Start moving every finger towards its queued goal.
    fn trigger_movement(&mut self);

    fn rock(&mut self) {
        for finger in Finger::ALL {
            self.retract(finger);
        }
        self.trigger_movement();
    }

    fn paper(&mut self) {
        for finger in Finger::ALL {
            self.extend(finger);
        }
        self.trigger_movement();
    }

    fn scissors(&mut self) {
        self.extend(Finger::Index);
        self.extend(Finger::Middle);
        self.retract(Finger::Ring);
        self.retract(Finger::Pinky);
        self.trigger_movement();
    }

    /// Visual cue that the bot is following the player's bobbing.
    fn idle_bob(&mut self) {
        self.rock();
    }

    /// Throw a move. Unknown moves are ignored.
    fn play(&mut self, mv: Move) {
        match mv {
            Move::Rock => self.rock(),
            Move::Paper => self.paper(),
            Move::Scissors => self.scissors(),
            Move::Unknown => log::warn!("Ignoring request to play an unknown move"),
        }
    }

    /// Return to the neutral, open-hand pose.
    fn reset(&mut self) {
        self.paper();
    }
}

/// Named hand poses recorded by [`RecordingHand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    Rock,
    Paper,
    Scissors,
    Bob,
    Neutral,
}

/// A single command seen by a [`RecordingHand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandAction {
    Extend(Finger),
    Retract(Finger),
    Trigger,
    Pose(Pose),
}

/// Actuator that records commands instead of moving anything.
///
/// Poses are recorded as a single [`HandAction::Pose`] rather than expanded
/// into primitives. Clones share the same log, so a test can keep one handle
/// while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingHand {
    actions: Arc<Mutex<Vec<HandAction>>>,
}

impl RecordingHand {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, action: HandAction) {
        log::trace!("Recorded hand action {action:?}");
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
    }

    /// Snapshot of every action so far, oldest first.
    pub fn actions(&self) -> Vec<HandAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Poses recorded so far, oldest first.
    pub fn poses(&self) -> Vec<Pose> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                HandAction::Pose(pose) => Some(pose),
                _ => None,
            })
            .collect()
    }

    /// Number of rock/paper/scissors throws recorded.
    pub fn throw_count(&self) -> usize {
        self.poses()
            .iter()
            .filter(|p| matches!(p, Pose::Rock | Pose::Paper | Pose::Scissors))
            .count()
    }

    pub fn clear(&self) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl HandActuator for RecordingHand {
    fn extend(&mut self, finger: Finger) {
        self.record(HandAction::Extend(finger));
    }

    fn retract(&mut self, finger: Finger) {
        self.record(HandAction::Retract(finger));
    }

    fn trigger_movement(&mut self) {
        self.record(HandAction::Trigger);
    }

    fn rock(&mut self) {
        self.record(HandAction::Pose(Pose::Rock));
    }

    fn paper(&mut self) {
        self.record(HandAction::Pose(Pose::Paper));
    }

    fn scissors(&mut self) {
        self.record(HandAction::Pose(Pose::Scissors));
    }

    fn idle_bob(&mut self) {
        self.record(HandAction::Pose(Pose::Bob));
    }

    fn reset(&mut self) {
        self.record(HandAction::Pose(Pose::Neutral));
    }
}
