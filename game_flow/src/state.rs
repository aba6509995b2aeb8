use motion::MotionPrediction;
use serde::{Deserialize, Serialize};
use shared::moves::{Move, Outcome};

/// Game controller states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    /// No bobbing seen yet
    Waiting,
    /// Following the player's bob towards the shoot
    Playing {
        /// Move already sent to the hand this round, if any
        committed_move: Option<Move>,
        /// When the last idle bob was sent to the hand
        last_bob_at: f64,
    },
    /// Shoot reached, waiting to read the player's gesture
    Pending { shoot_time: f64, bot_move: Move },
    /// Round resolved, showing the result
    RoundEnd {
        end_time: f64,
        bot_move: Move,
        player_move: Option<Move>,
        outcome: Outcome,
        confidence: Option<f32>,
    },
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::Waiting => "Waiting",
            GameState::Playing { .. } => "Playing",
            GameState::Pending { .. } => "Pending",
            GameState::RoundEnd { .. } => "RoundEnd",
        }
    }

    /// Text for a status display.
    pub fn describe(&self) -> String {
        match self {
            GameState::Waiting => "Waiting...".to_string(),
            GameState::Playing { .. } => "Playing:".to_string(),
            GameState::Pending { bot_move, .. } => {
                format!("SHOOT (Robot played {}...)", bot_move.to_string().to_uppercase())
            }
            GameState::RoundEnd {
                bot_move,
                player_move,
                outcome,
                confidence,
                ..
            } => outcome.describe(*bot_move, *player_move, *confidence),
        }
    }
}

/// Things that happened during one controller update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player is bobbing; emitted every tick while Playing
    Swinging { period: f64, phase: f64 },
    /// The hand was commanded to throw `bot_move`. `preempted` is true when
    /// the command went out ahead of the shoot to hide actuation latency.
    MoveCommitted {
        bot_move: Move,
        phase: f64,
        preempted: bool,
    },
    Shoot { bot_move: Move },
    RoundResolved {
        bot_move: Move,
        player_move: Option<Move>,
        outcome: Outcome,
    },
    /// Bobbing stopped before a move was committed
    Cancelled,
    /// Hand returned to neutral after a round
    Reset,
}

/// Read-only view of the controller after an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub time: f64,
    pub state: GameState,
    pub prediction: Option<MotionPrediction>,
    /// Prediction phase extrapolated to `time`
    pub phase: Option<f64>,
    pub events: Vec<GameEvent>,
}
