//! Serial driver for the stepper-motor robotic hand.
//!
//! The hand is an Arduino-class board driving one stepper per finger. This
//! module speaks its line protocol (see [`protocol`]) and implements
//! [`shared::hand_interface::HandActuator`] on top of it.

pub mod protocol;
pub mod serial;

pub use protocol::{HandCommand, MotorTarget, Query, RunState, StatusField, StatusLine};
pub use serial::{read_status_lines, spawn_status_reader, HandSerial};

use thiserror::Error;

/// Baud rate the hand firmware listens at.
pub const DEFAULT_BAUD_RATE: u32 = 250_000;

/// Motor steps between a fully open and a fully curled finger.
pub const FULL_CURL_STEPS: i32 = 2000;

/// Highest finger speed accepted, in full open-to-curl travels per second.
pub const MAX_FINGER_SPEED: f64 = 4.0;

#[derive(Error, Debug)]
pub enum HandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("Goal {0} is outside [0.0, 1.0]")]
    GoalOutOfRange(f64),
    #[error("Speed {0} is outside (0.0, {max}]", max = MAX_FINGER_SPEED)]
    SpeedOutOfRange(f64),
    #[error("Malformed status line: {0:?}")]
    MalformedStatus(String),
}
