//! Round state machine for the rock-paper-scissors bot.
//!
//! Rounds cycle through: Waiting -> Playing -> Pending -> RoundEnd -> Waiting
//!
//! [`GameController`] is advanced once per frame with the estimator's latest
//! prediction; [`RpsBot`] wires a position source, the estimator and the
//! controller into a single per-frame call.

pub mod bot;
pub mod config;
pub mod controller;
pub mod state;

pub use bot::{BotError, RpsBot};
pub use config::{GameConfig, GameConfigError, DEFAULT_REPERTOIRE};
pub use controller::GameController;
pub use state::{GameEvent, GameSnapshot, GameState};
