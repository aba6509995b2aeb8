//! Rock-paper-scissors harness for testing and simulation
//!
//! This crate provides synthetic hand motions and a simulated play session
//! that drives the full bot (estimator plus game controller) on a manual
//! clock, so whole rounds can be exercised without a camera or a hand.

pub mod bot_config;
pub mod session;
pub mod simulated_position;
pub mod test_motions;

pub use bot_config::{BotConfig, BotConfigError, DEFAULT_CONFIG_NAME};
pub use session::{run_session, RoundResult, SessionConfig, SessionError, SessionReport, Transition};
pub use simulated_position::SimulatedPosition;
pub use test_motions::{ChantMotion, HandMotion, SteadyBob, StillHand, TestMotions};
