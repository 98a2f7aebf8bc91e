//! Rock-paper-scissors, best of 3, simultaneous submissions.
//!
//! Each seat submits one hidden hand per round, in either order. A round is
//! scored only when both hands for that round are present, so the result
//! never depends on who submitted first.

use serde::{Deserialize, Serialize};
use wager_types::{GameType, Outcome, Result, Seat, WagerError};

use crate::rules::{GameRules, ensure_unresolved};

/// Maximum scored rounds in a match.
pub const ROUNDS: usize = 3;
/// Round wins that end the match early.
pub const WINS_NEEDED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    /// Rock beats scissors, scissors beats paper, paper beats rock.
    #[must_use]
    pub fn beats(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors) | (Self::Scissors, Self::Paper) | (Self::Paper, Self::Rock)
        )
    }
}

/// Winner of one round, or `None` for equal hands.
#[must_use]
pub fn score_round(creator: Hand, opponent: Hand) -> Option<Seat> {
    if creator.beats(opponent) {
        Some(Seat::Creator)
    } else if opponent.beats(creator) {
        Some(Seat::Opponent)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub creator: Hand,
    pub opponent: Hand,
    pub winner: Option<Seat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RockPaperScissors {
    /// Hands submitted for the current round, indexed by [`Seat::index`].
    pending: [Option<Hand>; 2],
    rounds: Vec<RoundResult>,
    score: [u8; 2],
    outcome: Outcome,
}

impl RockPaperScissors {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: [None, None],
            rounds: Vec::new(),
            score: [0, 0],
            outcome: Outcome::Unresolved,
        }
    }

    #[must_use]
    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    #[must_use]
    pub fn score(&self, seat: Seat) -> u8 {
        self.score[seat.index()]
    }

    /// Whether `seat` already submitted for the round in progress.
    #[must_use]
    pub fn has_submitted(&self, seat: Seat) -> bool {
        self.pending[seat.index()].is_some()
    }

    fn decide(&self) -> Outcome {
        let (c, o) = (self.score[0], self.score[1]);
        if c >= WINS_NEEDED {
            Outcome::Winner(Seat::Creator)
        } else if o >= WINS_NEEDED {
            Outcome::Winner(Seat::Opponent)
        } else if self.rounds.len() < ROUNDS {
            Outcome::Unresolved
        } else if c > o {
            Outcome::Winner(Seat::Creator)
        } else if o > c {
            Outcome::Winner(Seat::Opponent)
        } else {
            Outcome::Draw
        }
    }
}

impl Default for RockPaperScissors {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for RockPaperScissors {
    type Action = Hand;

    fn game_type(&self) -> GameType {
        GameType::RockPaperScissors
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn apply(&self, actor: Seat, hand: &Hand) -> Result<(Self, Outcome)> {
        ensure_unresolved(self.outcome)?;
        if self.has_submitted(actor) {
            return Err(WagerError::IllegalMove {
                reason: format!(
                    "{actor} already submitted for round {}",
                    self.rounds.len() + 1
                ),
            });
        }

        let mut next = self.clone();
        next.pending[actor.index()] = Some(*hand);

        if let [Some(creator), Some(opponent)] = next.pending {
            let winner = score_round(creator, opponent);
            if let Some(seat) = winner {
                next.score[seat.index()] += 1;
            }
            next.rounds.push(RoundResult {
                creator,
                opponent,
                winner,
            });
            next.pending = [None, None];
            next.outcome = next.decide();
        }
        let outcome = next.outcome;
        Ok((next, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Hand::{Paper, Rock, Scissors};

    fn round(game: &RockPaperScissors, creator: Hand, opponent: Hand) -> (RockPaperScissors, Outcome) {
        let (g, _) = game.apply(Seat::Creator, &creator).unwrap();
        g.apply(Seat::Opponent, &opponent).unwrap()
    }

    #[test]
    fn beats_table() {
        assert!(Rock.beats(Scissors));
        assert!(Scissors.beats(Paper));
        assert!(Paper.beats(Rock));
        assert!(!Rock.beats(Rock));
        assert!(!Scissors.beats(Rock));
    }

    #[test]
    fn scoring_is_symmetric() {
        for a in [Rock, Paper, Scissors] {
            for b in [Rock, Paper, Scissors] {
                let forward = score_round(a, b);
                let backward = score_round(b, a).map(Seat::other);
                assert_eq!(forward, backward, "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn single_submission_does_not_score() {
        let (game, outcome) = RockPaperScissors::new().apply(Seat::Opponent, &Rock).unwrap();
        assert_eq!(outcome, Outcome::Unresolved);
        assert!(game.rounds().is_empty());
        assert!(game.has_submitted(Seat::Opponent));
    }

    #[test]
    fn double_submission_rejected() {
        let (game, _) = RockPaperScissors::new().apply(Seat::Creator, &Rock).unwrap();
        let err = game.apply(Seat::Creator, &Paper).unwrap_err();
        assert!(matches!(err, WagerError::IllegalMove { .. }));
    }

    #[test]
    fn two_wins_end_match_early() {
        let g = RockPaperScissors::new();
        let (g, o) = round(&g, Rock, Scissors);
        assert_eq!(o, Outcome::Unresolved);
        let (g, o) = round(&g, Paper, Rock);
        assert_eq!(o, Outcome::Winner(Seat::Creator));
        assert_eq!(g.rounds().len(), 2);
        assert!(matches!(g.apply(Seat::Creator, &Rock).unwrap_err(), WagerError::AlreadyResolved));
    }

    #[test]
    fn three_tied_rounds_draw() {
        let g = RockPaperScissors::new();
        let (g, _) = round(&g, Rock, Rock);
        let (g, _) = round(&g, Rock, Paper);
        let (g, o) = round(&g, Scissors, Paper);
        assert_eq!(g.score(Seat::Creator), 1);
        assert_eq!(g.score(Seat::Opponent), 1);
        assert_eq!(o, Outcome::Draw);
    }

    #[test]
    fn single_lead_after_three_rounds_wins() {
        let g = RockPaperScissors::new();
        let (g, _) = round(&g, Rock, Rock);
        let (g, _) = round(&g, Paper, Paper);
        let (_, o) = round(&g, Rock, Paper);
        assert_eq!(o, Outcome::Winner(Seat::Opponent));
    }

    #[test]
    fn submission_order_does_not_matter() {
        let g = RockPaperScissors::new();
        let (a, _) = g.apply(Seat::Creator, &Paper).unwrap();
        let (a, oa) = a.apply(Seat::Opponent, &Rock).unwrap();
        let (b, _) = g.apply(Seat::Opponent, &Rock).unwrap();
        let (b, ob) = b.apply(Seat::Creator, &Paper).unwrap();
        assert_eq!(a, b);
        assert_eq!(oa, ob);
    }
}
