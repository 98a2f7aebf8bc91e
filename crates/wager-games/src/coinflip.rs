//! Coin flip with a committed, externally verifiable coin.
//!
//! The coordinator draws a secret seed when the game is opened and the rule
//! state stores only `SHA-256(seed)`. The opponent calls a side without
//! knowing the seed; the call carries the seed reveal, which must match the
//! commitment. The face is the low bit of
//! `SHA-256("wager:coinflip:v1:" || seed)`, so anyone holding the revealed
//! seed can recompute the result. The creator is implicitly assigned the
//! opposite side and cannot choose.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use wager_types::{GameType, Outcome, Result, Seat, WagerError};

use crate::rules::{GameRules, ensure_unresolved};

const FACE_SEED: &[u8] = b"wager:coinflip:v1:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Heads => Self::Tails,
            Self::Tails => Self::Heads,
        }
    }
}

/// The opponent's call plus the coordinator's seed reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinCall {
    pub side: CoinSide,
    pub reveal: [u8; 32],
}

/// `SHA-256(seed)`.
#[must_use]
pub fn commit(seed: &[u8; 32]) -> [u8; 32] {
    Sha256::digest(seed).into()
}

/// Coin face for a revealed seed.
#[must_use]
pub fn face(seed: &[u8; 32]) -> CoinSide {
    let mut hasher = Sha256::new();
    hasher.update(FACE_SEED);
    hasher.update(seed);
    let digest = hasher.finalize();
    if digest[0] & 1 == 0 {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinFlip {
    commitment: [u8; 32],
    opponent_side: Option<CoinSide>,
    revealed_seed: Option<[u8; 32]>,
    result: Option<CoinSide>,
    outcome: Outcome,
}

impl CoinFlip {
    #[must_use]
    pub fn new(commitment: [u8; 32]) -> Self {
        Self {
            commitment,
            opponent_side: None,
            revealed_seed: None,
            result: None,
            outcome: Outcome::Unresolved,
        }
    }

    #[must_use]
    pub fn commitment_hex(&self) -> String {
        hex::encode(self.commitment)
    }

    #[must_use]
    pub fn side_of(&self, seat: Seat) -> Option<CoinSide> {
        match seat {
            Seat::Opponent => self.opponent_side,
            Seat::Creator => self.opponent_side.map(CoinSide::opposite),
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<CoinSide> {
        self.result
    }

    /// Recompute the flip from the stored reveal. `false` before the flip.
    #[must_use]
    pub fn verify(&self) -> bool {
        match (self.revealed_seed, self.result) {
            (Some(seed), Some(result)) => commit(&seed) == self.commitment && face(&seed) == result,
            _ => false,
        }
    }
}

impl GameRules for CoinFlip {
    type Action = CoinCall;

    fn game_type(&self) -> GameType {
        GameType::CoinFlip
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn apply(&self, actor: Seat, call: &CoinCall) -> Result<(Self, Outcome)> {
        ensure_unresolved(self.outcome)?;
        if actor != Seat::Opponent {
            return Err(WagerError::IllegalMove {
                reason: "only the opponent calls the coin; the creator takes the other side".into(),
            });
        }
        if commit(&call.reveal) != self.commitment {
            return Err(WagerError::CommitmentMismatch);
        }

        let result = face(&call.reveal);
        let winner = if result == call.side {
            Seat::Opponent
        } else {
            Seat::Creator
        };

        let mut next = self.clone();
        next.opponent_side = Some(call.side);
        next.revealed_seed = Some(call.reveal);
        next.result = Some(result);
        next.outcome = Outcome::Winner(winner);
        let outcome = next.outcome;
        Ok((next, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [7u8; 32];

    #[test]
    fn matching_call_wins_for_opponent() {
        let game = CoinFlip::new(commit(&SEED));
        let side = face(&SEED);
        let (next, outcome) = game.apply(Seat::Opponent, &CoinCall { side, reveal: SEED }).unwrap();
        assert_eq!(outcome, Outcome::Winner(Seat::Opponent));
        assert_eq!(next.outcome(), outcome);
        assert_eq!(next.side_of(Seat::Creator), Some(side.opposite()));
        assert!(next.verify());
    }

    #[test]
    fn wrong_call_wins_for_creator() {
        let game = CoinFlip::new(commit(&SEED));
        let side = face(&SEED).opposite();
        let (_, outcome) = game.apply(Seat::Opponent, &CoinCall { side, reveal: SEED }).unwrap();
        assert_eq!(outcome, Outcome::Winner(Seat::Creator));
    }

    #[test]
    fn creator_cannot_choose() {
        let game = CoinFlip::new(commit(&SEED));
        let err = game
            .apply(Seat::Creator, &CoinCall { side: CoinSide::Heads, reveal: SEED })
            .unwrap_err();
        assert!(matches!(err, WagerError::IllegalMove { .. }));
    }

    #[test]
    fn forged_reveal_rejected() {
        let game = CoinFlip::new(commit(&SEED));
        let err = game
            .apply(Seat::Opponent, &CoinCall { side: CoinSide::Heads, reveal: [8u8; 32] })
            .unwrap_err();
        assert!(matches!(err, WagerError::CommitmentMismatch));
        assert!(!game.verify());
    }

    #[test]
    fn no_second_flip() {
        let game = CoinFlip::new(commit(&SEED));
        let (next, _) = game
            .apply(Seat::Opponent, &CoinCall { side: CoinSide::Tails, reveal: SEED })
            .unwrap();
        let err = next
            .apply(Seat::Opponent, &CoinCall { side: CoinSide::Heads, reveal: SEED })
            .unwrap_err();
        assert!(matches!(err, WagerError::AlreadyResolved));
    }

    #[test]
    fn both_faces_reachable() {
        let faces: std::collections::HashSet<CoinSide> =
            (0u8..32).map(|b| face(&[b; 32])).collect();
        assert_eq!(faces.len(), 2);
    }
}
