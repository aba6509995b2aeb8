//! Periodic-motion estimation for the rock-paper-scissors bot.
//!
//! Turns a noisy, irregularly sampled hand height into a prediction of the
//! bobbing period, the current phase (half-cycles completed) and the time at
//! which the "shoot" phase will be reached.
//!
//! The pipeline, leaves first:
//! - [`history::History`] - bounded store of raw and filtered samples
//! - [`filter::StateFilter`] - constant-velocity Kalman smoother
//! - [`resample`] - uniform-grid resampling of the filtered window
//! - [`turning_points`] - prominence-gated peak/valley detection
//! - [`predictor::MotionAnalyzer`] - ties the above together and publishes
//!   [`predictor::MotionPrediction`]s
//!
//! [`source::HeightSelector`] picks where heights come from: the hand detector
//! when it sees the hand, a region tracker otherwise.

pub mod config;
pub mod filter;
pub mod history;
pub mod predictor;
pub mod resample;
pub mod source;
pub mod turning_points;

pub use config::{MotionConfig, MotionConfigError, ResampleMethod};
pub use filter::{FilteredState, StateFilter};
pub use history::{History, HistoryEntry};
pub use predictor::{MotionAnalyzer, MotionPrediction, SHOOT_PHASE};
pub use source::{HeightSelector, RegionTracker};
pub use turning_points::{TurningKind, TurningPoint};
