use serde::{Deserialize, Serialize};
use shared::moves::Move;
use thiserror::Error;

/// Moves the bot picks from by default.
pub const DEFAULT_REPERTOIRE: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameConfigError {
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("shoot phase {shoot} must be greater than start phase {start}")]
    PhaseOrder { start: f64, shoot: f64 },
    #[error("repertoire must contain at least one move")]
    EmptyRepertoire,
    #[error("repertoire may only contain rock, paper or scissors, found {0}")]
    UnplayableMove(Move),
}

/// Timing and move selection for [`crate::GameController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Settle time after the shoot before reading the player's gesture (seconds)
    pub wait_after_act_secs: f64,
    /// Give up on recognising the player's gesture this long after the shoot (seconds)
    pub max_wait_for_recognition_secs: f64,
    /// How long a round result is shown before the next round (seconds)
    pub result_display_secs: f64,
    /// Time the hand needs to form a gesture once commanded (seconds)
    pub actuation_lead_secs: f64,
    /// Moves chosen from, uniformly at random
    pub repertoire: Vec<Move>,
    /// Phase above which the player is considered to be bobbing
    pub start_phase: f64,
    /// Phase at which the throw must land
    pub shoot_phase: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            wait_after_act_secs: 1.5,
            max_wait_for_recognition_secs: 2.0,
            result_display_secs: 2.5,
            actuation_lead_secs: 0.3,
            repertoire: DEFAULT_REPERTOIRE.to_vec(),
            start_phase: 0.5,
            shoot_phase: motion::SHOOT_PHASE,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameConfigError> {
        for (name, value) in [
            ("wait_after_act_secs", self.wait_after_act_secs),
            (
                "max_wait_for_recognition_secs",
                self.max_wait_for_recognition_secs,
            ),
            ("result_display_secs", self.result_display_secs),
            ("actuation_lead_secs", self.actuation_lead_secs),
            ("start_phase", self.start_phase),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GameConfigError::Negative { name, value });
            }
        }

        if !(self.shoot_phase.is_finite() && self.shoot_phase > self.start_phase) {
            return Err(GameConfigError::PhaseOrder {
                start: self.start_phase,
                shoot: self.shoot_phase,
            });
        }

        if self.repertoire.is_empty() {
            return Err(GameConfigError::EmptyRepertoire);
        }
        if let Some(mv) = self.repertoire.iter().find(|m| !m.is_concrete()) {
            return Err(GameConfigError::UnplayableMove(*mv));
        }
        Ok(())
    }

    /// Phase at which the move must be commanded so it lands at the shoot.
    pub fn trigger_phase(&self, period: f64) -> f64 {
        (self.shoot_phase - self.actuation_lead_secs / period).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_trigger_phase() {
        let config = GameConfig {
            actuation_lead_secs: 2.0,
            ..Default::default()
        };
        assert_abs_diff_eq!(config.trigger_phase(2.0), 3.0);
        // a lead longer than the whole chant clamps to the start
        assert_abs_diff_eq!(config.trigger_phase(0.25), 0.0);
    }

    #[test]
    fn test_validate_rejects() {
        let config = GameConfig {
            repertoire: vec![],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(GameConfigError::EmptyRepertoire));

        let config = GameConfig {
            repertoire: vec![Move::Rock, Move::Unknown],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(GameConfigError::UnplayableMove(Move::Unknown))
        );

        let config = GameConfig {
            shoot_phase: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GameConfigError::PhaseOrder { .. })
        ));

        let config = GameConfig {
            actuation_lead_secs: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GameConfigError::Negative {
                name: "actuation_lead_secs",
                ..
            })
        ));
    }
}
