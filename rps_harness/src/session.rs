//! Simulated play sessions.
//!
//! A session runs the full bot frame by frame on a [`ManualClock`]: the
//! simulated position source samples a synthetic motion, the estimator and
//! controller react, and a scripted player "shows" their gesture to the
//! classifier shortly after the bot shoots.

use game_flow::{BotError, GameController, GameEvent, GameState, RpsBot};
use motion::MotionAnalyzer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use shared::clock::{Clock, ManualClock};
use shared::gesture::LatestGesture;
use shared::hand_interface::{HandAction, RecordingHand};
use shared::moves::{Move, Outcome};
use thiserror::Error;

use crate::bot_config::BotConfig;
use crate::simulated_position::SimulatedPosition;
use crate::test_motions::HandMotion;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Bot(#[from] BotError),
    #[error("noise level must be finite and non-negative, got {0}")]
    Noise(f64),
    #[error("frame rate must be positive, got {0}")]
    FrameRate(f64),
}

/// How the simulated frames and the scripted player behave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub fps: f64,
    pub duration_secs: f64,
    /// Gesture the player shows after each shoot; `None` never shows one
    pub player_move: Option<Move>,
    pub player_confidence: Option<f32>,
    /// Delay between the bot's shoot and the classifier seeing the gesture
    pub reveal_delay_secs: f64,
    /// Standard deviation of height noise
    pub noise_sigma: f64,
    /// Probability of a frame without a height
    pub dropout_rate: f64,
    /// Seeds both the noise and the bot's move choice
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            duration_secs: 10.0,
            player_move: Some(Move::Rock),
            player_confidence: Some(0.9),
            reveal_delay_secs: 0.2,
            noise_sigma: 0.0,
            dropout_rate: 0.0,
            seed: 7,
        }
    }
}

/// A controller state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub time: f64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub time: f64,
    pub bot_move: Move,
    pub player_move: Option<Move>,
    pub outcome: Outcome,
}

/// Everything observed during a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub frames: usize,
    pub transitions: Vec<Transition>,
    /// Controller events with the time they were emitted
    pub events: Vec<(f64, GameEvent)>,
    pub hand_actions: Vec<HandAction>,
    pub rounds: Vec<RoundResult>,
}

impl SessionReport {
    /// Number of moves sent to the hand.
    pub fn commits(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, e)| matches!(e, GameEvent::MoveCommitted { .. }))
            .count()
    }

    pub fn shoot_times(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter(|(_, e)| matches!(e, GameEvent::Shoot { .. }))
            .map(|(t, _)| *t)
            .collect()
    }

    /// Names of the states visited, starting from Waiting.
    pub fn state_path(&self) -> Vec<&str> {
        std::iter::once("Waiting")
            .chain(self.transitions.iter().map(|t| t.to.as_str()))
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} frames, {} transitions, {} rounds",
            self.frames,
            self.transitions.len(),
            self.rounds.len()
        )];
        for t in &self.transitions {
            lines.push(format!("  {:6.2}s  {} -> {}", t.time, t.from, t.to));
        }
        for round in &self.rounds {
            lines.push(format!(
                "  {:6.2}s  {}",
                round.time,
                round.outcome.describe(round.bot_move, round.player_move, None)
            ));
        }
        lines.join("\n")
    }
}

/// Run the bot against `motion` for `session.duration_secs`.
pub fn run_session(
    config: &BotConfig,
    motion: Box<dyn HandMotion>,
    session: &SessionConfig,
) -> Result<SessionReport, SessionError> {
    if !(session.fps > 0.0 && session.fps.is_finite()) {
        return Err(SessionError::FrameRate(session.fps));
    }

    let clock = ManualClock::starting_at(0.0);
    let hand = RecordingHand::new();
    let gestures = LatestGesture::new();

    let position = SimulatedPosition::new(motion, clock.clone())
        .with_noise(session.noise_sigma, session.seed)?
        .with_dropouts(session.dropout_rate);
    let analyzer =
        MotionAnalyzer::new(config.motion.clone(), clock.clone()).map_err(BotError::from)?;
    let controller = GameController::with_rng(
        config.game.clone(),
        hand.clone(),
        gestures.clone(),
        clock.clone(),
        ChaCha8Rng::seed_from_u64(session.seed),
    )
    .map_err(BotError::from)?;
    let mut bot = RpsBot::from_parts(position, analyzer, controller);

    let frames = (session.duration_secs * session.fps).floor().max(0.0) as usize;
    let mut report = SessionReport {
        frames,
        ..Default::default()
    };
    let mut previous_state = GameState::Waiting.name();
    let mut reveal_at: Option<f64> = None;

    for frame in 0..frames {
        clock.set(frame as f64 / session.fps);

        if let (Some(at), Some(player_move)) = (reveal_at, session.player_move) {
            if clock.now() >= at {
                log::debug!("Player shows {player_move}");
                gestures.publish(player_move, session.player_confidence);
                reveal_at = None;
            }
        }

        let snapshot = bot.tick();

        let state = snapshot.state.name();
        if state != previous_state {
            report.transitions.push(Transition {
                time: snapshot.time,
                from: previous_state.to_string(),
                to: state.to_string(),
            });
            previous_state = state;
        }

        for event in snapshot.events {
            match &event {
                GameEvent::Shoot { .. } => {
                    reveal_at = Some(snapshot.time + session.reveal_delay_secs);
                }
                GameEvent::RoundResolved {
                    bot_move,
                    player_move,
                    outcome,
                } => report.rounds.push(RoundResult {
                    time: snapshot.time,
                    bot_move: *bot_move,
                    player_move: *player_move,
                    outcome: *outcome,
                }),
                GameEvent::Reset => gestures.clear(),
                _ => {}
            }
            report.events.push((snapshot.time, event));
        }
    }

    report.hand_actions = hand.actions();
    Ok(report)
}
