//! Wire protocol of the stepper-motor hand controller.
//!
//! Commands are newline-terminated ASCII lines:
//!
//! ```text
//! <motor>|<HEADER>: <data>\n
//! ```
//!
//! `<motor>` is `1`-`4` for a single finger or `A` for all of them. Headers:
//!
//! | Header  | Data                              | Effect                          |
//! |---------|-----------------------------------|---------------------------------|
//! | `GOAL`  | target position, integer steps    | queue a move (needs `STATE`)    |
//! | `SPEED` | max speed, steps per second       | acceleration follows at 2x      |
//! | `STATE` | `MOVE` or `STOP`                  | start or halt queued moves      |
//! | `ZERO`  | -                                 | current position becomes 0      |
//! | `GET`   | `POS`, `SPEED`, `GOAL` or `STATE` | board replies with status lines |
//!
//! The board answers most commands with one status line per motor, e.g.
//! `S1 Goal: 2000`, `S3 Speed: 600.00`, `S2 Running: 1` or `S4 Pos: 0`.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use super::HandError;
use shared::hand_interface::Finger;

/// Addressed motor(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorTarget {
    Finger(Finger),
    All,
}

impl fmt::Display for MotorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorTarget::Finger(finger) => write!(f, "{}", finger.motor_id()),
            MotorTarget::All => write!(f, "A"),
        }
    }
}

impl From<Finger> for MotorTarget {
    fn from(finger: Finger) -> Self {
        MotorTarget::Finger(finger)
    }
}

impl From<Option<Finger>> for MotorTarget {
    fn from(finger: Option<Finger>) -> Self {
        finger.map_or(MotorTarget::All, MotorTarget::Finger)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RunState {
    Move,
    Stop,
}

/// Values that can be read back with `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Query {
    Pos,
    Speed,
    Goal,
    State,
}

/// A single controller command.
#[derive(Debug, Clone, PartialEq)]
pub enum HandCommand {
    Goal { target: MotorTarget, steps: i32 },
    Speed { target: MotorTarget, steps_per_sec: f64 },
    State { target: MotorTarget, run: RunState },
    Zero,
    Get { target: MotorTarget, query: Query },
}

impl HandCommand {
    /// The command as sent on the wire, newline included.
    pub fn encode(&self) -> String {
        match self {
            HandCommand::Goal { target, steps } => format!("{target}|GOAL: {steps}\n"),
            HandCommand::Speed {
                target,
                steps_per_sec,
            } => format!("{target}|SPEED: {steps_per_sec:.1}\n"),
            HandCommand::State { target, run } => format!("{target}|STATE: {run}\n"),
            HandCommand::Zero => "A|ZERO: \n".to_string(),
            HandCommand::Get { target, query } => format!("{target}|GET: {query}\n"),
        }
    }
}

/// Field reported in a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum StatusField {
    Goal,
    Speed,
    Pos,
    Running,
}

/// One parsed status line from the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusLine {
    /// One-based motor number as reported (5 is an unconnected spare channel)
    pub motor: u8,
    pub field: StatusField,
    pub value: f64,
}

impl StatusLine {
    /// Finger driven by the reporting motor, if it drives one.
    pub fn finger(&self) -> Option<Finger> {
        Finger::from_motor_id(self.motor)
    }
}

impl FromStr for StatusLine {
    type Err = HandError;

    /// Parse lines such as `S1 Goal: 2000`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || HandError::MalformedStatus(line.to_string());
        let trimmed = line.trim();

        let (head, value) = trimmed.split_once(':').ok_or_else(malformed)?;
        let (motor, field) = head.trim().split_once(' ').ok_or_else(malformed)?;

        let motor = motor
            .strip_prefix('S')
            .and_then(|m| m.parse::<u8>().ok())
            .ok_or_else(malformed)?;
        let field = field.trim().parse::<StatusField>().map_err(|_| malformed())?;
        let value = value.trim().parse::<f64>().map_err(|_| malformed())?;

        Ok(StatusLine {
            motor,
            field,
            value,
        })
    }
}
