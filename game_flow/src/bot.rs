//! Per-frame driver tying the estimator to the controller.

use motion::{MotionAnalyzer, MotionConfig, MotionConfigError};
use shared::clock::Clock;
use shared::gesture::GestureSource;
use shared::hand_interface::HandActuator;
use shared::position::PositionSource;
use thiserror::Error;

use crate::config::{GameConfig, GameConfigError};
use crate::controller::GameController;
use crate::state::GameSnapshot;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BotError {
    #[error("invalid motion config: {0}")]
    Motion(#[from] MotionConfigError),
    #[error("invalid game config: {0}")]
    Game(#[from] GameConfigError),
}

/// The whole bot: one [`RpsBot::tick`] per captured frame.
///
/// Each tick reads the hand height, adds it to the estimator, then advances
/// the controller with the resulting prediction.
pub struct RpsBot<P, A, G, C: Clock> {
    position: P,
    analyzer: MotionAnalyzer<C>,
    controller: GameController<A, G, C>,
}

impl<P, A, G, C> RpsBot<P, A, G, C>
where
    P: PositionSource,
    A: HandActuator,
    G: GestureSource,
    C: Clock + Clone,
{
    pub fn new(
        motion_config: MotionConfig,
        game_config: GameConfig,
        position: P,
        hand: A,
        gestures: G,
        clock: C,
    ) -> Result<Self, BotError> {
        let analyzer = MotionAnalyzer::new(motion_config, clock.clone())?;
        let controller = GameController::new(game_config, hand, gestures, clock)?;
        Ok(Self::from_parts(position, analyzer, controller))
    }

    /// Assemble a bot from an already built estimator and controller.
    pub fn from_parts(
        position: P,
        analyzer: MotionAnalyzer<C>,
        controller: GameController<A, G, C>,
    ) -> Self {
        Self {
            position,
            analyzer,
            controller,
        }
    }

    pub fn tick(&mut self) -> GameSnapshot {
        let height = self.position.current_height();
        self.analyzer.add_sample_now(height);
        self.controller.update(self.analyzer.prediction())
    }

    pub fn analyzer(&self) -> &MotionAnalyzer<C> {
        &self.analyzer
    }

    pub fn controller(&self) -> &GameController<A, G, C> {
        &self.controller
    }

    pub fn position_mut(&mut self) -> &mut P {
        &mut self.position
    }
}
