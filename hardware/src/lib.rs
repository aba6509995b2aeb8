//! Hardware drivers for the rock-paper-scissors bot.

#[cfg(feature = "hand")]
pub mod hand;
