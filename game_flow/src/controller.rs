//! Round state machine.
//!
//! Advanced once per frame with the estimator's latest prediction. Every
//! timer is measured against the injected clock, and leaving a round for
//! Waiting drops all of its state.

use motion::MotionPrediction;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
use shared::clock::Clock;
use shared::gesture::GestureSource;
use shared::hand_interface::HandActuator;
use shared::moves::{Move, Outcome};

use crate::config::{GameConfig, GameConfigError};
use crate::state::{GameEvent, GameSnapshot, GameState};

pub struct GameController<A, G, C> {
    state: GameState,
    config: GameConfig,
    hand: A,
    gestures: G,
    clock: C,
    rng: Box<dyn RngCore + Send>,
}

impl<A: HandActuator, G: GestureSource, C: Clock> GameController<A, G, C> {
    /// Controller picking moves with an OS-seeded generator.
    pub fn new(
        config: GameConfig,
        hand: A,
        gestures: G,
        clock: C,
    ) -> Result<Self, GameConfigError> {
        Self::with_rng(config, hand, gestures, clock, StdRng::from_os_rng())
    }

    /// Controller picking moves with the given generator.
    pub fn with_rng(
        config: GameConfig,
        hand: A,
        gestures: G,
        clock: C,
        rng: impl RngCore + Send + 'static,
    ) -> Result<Self, GameConfigError> {
        config.validate()?;
        Ok(Self {
            state: GameState::Waiting,
            config,
            hand,
            gestures,
            clock,
            rng: Box::new(rng),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn hand(&self) -> &A {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut A {
        &mut self.hand
    }

    pub fn gestures(&self) -> &G {
        &self.gestures
    }

    /// Advance the state machine by one tick.
    pub fn update(&mut self, prediction: Option<MotionPrediction>) -> GameSnapshot {
        use GameState::*;

        let now = self.clock.now();
        let phase = prediction.map(|p| p.phase_at(now));
        let mut events = Vec::new();

        let new_state = match self.state.clone() {
            Waiting => match phase {
                Some(p) if p > self.config.start_phase => {
                    log::info!("Bobbing detected (phase {p:.2}), entering Playing");
                    self.hand.idle_bob();
                    Playing {
                        committed_move: None,
                        last_bob_at: now,
                    }
                }
                _ => Waiting,
            },

            Playing {
                committed_move,
                last_bob_at,
            } => self.update_playing(now, prediction, committed_move, last_bob_at, &mut events),

            Pending {
                shoot_time,
                bot_move,
            } => self.update_pending(now, shoot_time, bot_move, &mut events),

            RoundEnd { end_time, .. } => {
                if now - end_time >= self.config.result_display_secs {
                    log::info!("Round over, resetting hand and returning to Waiting");
                    self.hand.reset();
                    events.push(GameEvent::Reset);
                    Waiting
                } else {
                    self.state.clone()
                }
            }
        };

        self.state = new_state;
        GameSnapshot {
            time: now,
            state: self.state.clone(),
            prediction,
            phase,
            events,
        }
    }

    fn update_playing(
        &mut self,
        now: f64,
        prediction: Option<MotionPrediction>,
        mut committed_move: Option<Move>,
        mut last_bob_at: f64,
        events: &mut Vec<GameEvent>,
    ) -> GameState {
        let live = prediction
            .map(|p| (p, p.phase_at(now)))
            .filter(|(_, phase)| *phase >= self.config.start_phase);

        let Some((prediction, phase)) = live else {
            return match committed_move {
                // The hand already threw; judge the round anyway
                Some(bot_move) => {
                    log::warn!("Lost the bob after committing {bot_move}, entering Pending");
                    events.push(GameEvent::Shoot { bot_move });
                    GameState::Pending {
                        shoot_time: now,
                        bot_move,
                    }
                }
                None => {
                    log::info!("Bobbing stopped, returning to Waiting");
                    events.push(GameEvent::Cancelled);
                    GameState::Waiting
                }
            };
        };

        let period = prediction.period;
        events.push(GameEvent::Swinging { period, phase });

        let trigger = self.config.trigger_phase(period);
        if committed_move.is_none() && phase >= trigger {
            let bot_move = self.choose_move();
            let preempted = phase < self.config.shoot_phase;
            log::debug!(
                "Committing {bot_move} at phase {phase:.2} (trigger {trigger:.2}, preempted: {preempted})"
            );
            self.hand.play(bot_move);
            committed_move = Some(bot_move);
            events.push(GameEvent::MoveCommitted {
                bot_move,
                phase,
                preempted,
            });
        }

        if let Some(bot_move) = committed_move {
            if phase >= self.config.shoot_phase {
                log::info!("Shoot with {bot_move}, entering Pending");
                events.push(GameEvent::Shoot { bot_move });
                return GameState::Pending {
                    shoot_time: now,
                    bot_move,
                };
            }
        } else if now - last_bob_at >= period {
            self.hand.idle_bob();
            last_bob_at = now;
        }

        GameState::Playing {
            committed_move,
            last_bob_at,
        }
    }

    fn update_pending(
        &mut self,
        now: f64,
        shoot_time: f64,
        bot_move: Move,
        events: &mut Vec<GameEvent>,
    ) -> GameState {
        let elapsed = now - shoot_time;
        if elapsed < self.config.wait_after_act_secs {
            return GameState::Pending {
                shoot_time,
                bot_move,
            };
        }

        let player_move = self.gestures.latest_gesture();
        let (outcome, confidence) = match player_move {
            Some(seen) if seen.is_concrete() => {
                let outcome = bot_move.try_versus(seen).unwrap_or_else(|e| {
                    log::warn!("{e}");
                    Outcome::Unknown
                });
                (outcome, self.gestures.latest_confidence())
            }
            _ if elapsed >= self.config.max_wait_for_recognition_secs => {
                log::warn!("No gesture recognised {elapsed:.2}s after the shoot");
                (Outcome::Unknown, None)
            }
            _ => {
                return GameState::Pending {
                    shoot_time,
                    bot_move,
                }
            }
        };

        log::info!(
            "{}, entering RoundEnd",
            outcome.describe(bot_move, player_move, confidence)
        );
        events.push(GameEvent::RoundResolved {
            bot_move,
            player_move,
            outcome,
        });
        GameState::RoundEnd {
            end_time: now,
            bot_move,
            player_move,
            outcome,
            confidence,
        }
    }

    fn choose_move(&mut self) -> Move {
        // validate() guarantees a non-empty repertoire
        self.config
            .repertoire
            .choose(&mut *self.rng)
            .copied()
            .unwrap_or(Move::Rock)
    }
}
