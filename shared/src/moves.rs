//! Rock-paper-scissors moves and the beats-relationship between them.
//!
//! `Move::Unknown` is the sentinel for "the classifier did not produce a usable
//! gesture". It never wins, loses or draws: [`Move::versus`] maps any pairing
//! involving it to [`Outcome::Unknown`], and [`Move::try_versus`] rejects it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// A hand gesture played by either side of a round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
    /// No valid gesture observed
    Unknown,
}

/// Result of a round from the perspective of the move on the left of `versus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
    /// At least one side's move could not be determined
    Unknown,
}

/// Errors raised by the game rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("cannot compare moves when one is unknown: {0} vs. {1}")]
    UnknownMove(Move, Move),
}

impl Move {
    /// The three playable moves.
    pub const CONCRETE: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// True for rock, paper and scissors.
    pub fn is_concrete(self) -> bool {
        !matches!(self, Move::Unknown)
    }

    /// Map a classifier category name to a move.
    ///
    /// Anything other than `rock`, `paper` or `scissors` (including the
    /// classifier's own `none` and empty categories) is [`Move::Unknown`].
    pub fn from_label(label: &str) -> Move {
        match label.trim().parse::<Move>() {
            Ok(mv) => mv,
            Err(_) => Move::Unknown,
        }
    }

    /// True if `self` beats `other`. Unknown moves never beat anything.
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors) | (Move::Scissors, Move::Paper) | (Move::Paper, Move::Rock)
        )
    }

    /// Strict comparison: both moves must be concrete.
    pub fn try_versus(self, other: Move) -> Result<Outcome, RulesError> {
        if !self.is_concrete() || !other.is_concrete() {
            return Err(RulesError::UnknownMove(self, other));
        }

        Ok(if self == other {
            Outcome::Draw
        } else if self.beats(other) {
            Outcome::Win
        } else {
            Outcome::Loss
        })
    }

    /// Outcome of `self` against `other`, `Outcome::Unknown` if either is unknown.
    pub fn versus(self, other: Move) -> Outcome {
        self.try_versus(other).unwrap_or(Outcome::Unknown)
    }
}

impl Outcome {
    /// Human readable summary of a round, written from the bot's side.
    pub fn describe(
        self,
        bot_move: Move,
        player_move: Option<Move>,
        confidence: Option<f32>,
    ) -> String {
        let player = player_move.unwrap_or(Move::Unknown);
        let score = confidence
            .map(|c| format!(" ({c:.2})"))
            .unwrap_or_default();

        match self {
            Outcome::Win => format!("Bot wins - {bot_move} beats {player}{score}"),
            Outcome::Draw => format!("Draw - both {bot_move}{score}"),
            Outcome::Loss => format!("Player wins - {player}{score} beats {bot_move}"),
            Outcome::Unknown => "Could not determine player move".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_outcome_law() {
        assert_eq!(Move::Rock.versus(Move::Scissors), Outcome::Win);
        assert_eq!(Move::Scissors.versus(Move::Rock), Outcome::Loss);
        assert_eq!(Move::Paper.versus(Move::Paper), Outcome::Draw);
        assert_eq!(Move::Scissors.versus(Move::Paper), Outcome::Win);
        assert_eq!(Move::Paper.versus(Move::Rock), Outcome::Win);
        assert_eq!(Move::Rock.versus(Move::Paper), Outcome::Loss);
    }

    #[test]
    fn test_unknown_pairings() {
        for mv in Move::iter() {
            assert_eq!(mv.versus(Move::Unknown), Outcome::Unknown);
            assert_eq!(Move::Unknown.versus(mv), Outcome::Unknown);
            assert!(mv.try_versus(Move::Unknown).is_err());
        }
    }

    #[test]
    fn test_outcome_is_antisymmetric() {
        for a in Move::CONCRETE {
            for b in Move::CONCRETE {
                let forward = a.versus(b);
                let backward = b.versus(a);
                match forward {
                    Outcome::Win => assert_eq!(backward, Outcome::Loss),
                    Outcome::Loss => assert_eq!(backward, Outcome::Win),
                    Outcome::Draw => assert_eq!(backward, Outcome::Draw),
                    Outcome::Unknown => panic!("concrete moves produced unknown"),
                }
            }
        }
    }

    #[test]
    fn test_from_label() {
        assert_eq!(Move::from_label("rock"), Move::Rock);
        assert_eq!(Move::from_label("Paper"), Move::Paper);
        assert_eq!(Move::from_label(" scissors "), Move::Scissors);
        assert_eq!(Move::from_label("none"), Move::Unknown);
        assert_eq!(Move::from_label(""), Move::Unknown);
        assert_eq!(Move::from_label("thumbs_up"), Move::Unknown);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            Outcome::Win.describe(Move::Rock, Some(Move::Scissors), Some(0.9)),
            "Bot wins - rock beats scissors (0.90)"
        );
        assert_eq!(
            Outcome::Unknown.describe(Move::Rock, None, None),
            "Could not determine player move"
        );
    }
}
