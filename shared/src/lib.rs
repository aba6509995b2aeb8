//! Rules, interfaces and utilities shared by every part of the bot.

#[cfg(feature = "config-storage")]
pub mod config_storage;

pub mod clock;
pub mod gesture;
pub mod hand_interface;
pub mod moves;
pub mod position;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use gesture::{GestureReading, GestureSource, LatestGesture};
pub use hand_interface::{Finger, HandAction, HandActuator, Pose, RecordingHand};
pub use moves::{Move, Outcome, RulesError};
pub use position::{PositionSource, ReplayPosition};
pub use rate_limit::RateLimiter;
