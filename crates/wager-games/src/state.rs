//! Tagged union over every game's rule state.
//!
//! The session coordinator stores one [`GameState`] per live game and writes
//! its JSON encoding into the record's opaque `game_data`. The escrow ledger
//! never decodes it.

use serde::{Deserialize, Serialize};
use wager_types::{GameType, Outcome, Result, Seat, WagerError};

use crate::{
    CoinCall, CoinFlip, Connect4, DropDisc, GameRules, Hand, Mark, RockPaperScissors, TicTacToe,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", content = "state")]
pub enum GameState {
    TicTacToe(TicTacToe),
    Connect4(Connect4),
    RockPaperScissors(RockPaperScissors),
    CoinFlip(CoinFlip),
}

/// One player action, tagged by the game it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    Mark(Mark),
    Drop(DropDisc),
    Throw(Hand),
    Call(CoinCall),
}

impl GameState {
    /// Fresh state for `game_type`. Coin flips require the seed commitment.
    pub fn new(game_type: GameType, coin_commitment: Option<[u8; 32]>) -> Result<Self> {
        Ok(match game_type {
            GameType::TicTacToe => Self::TicTacToe(TicTacToe::new()),
            GameType::Connect4 => Self::Connect4(Connect4::new()),
            GameType::RockPaperScissors => Self::RockPaperScissors(RockPaperScissors::new()),
            GameType::CoinFlip => {
                let commitment = coin_commitment.ok_or_else(|| {
                    WagerError::Internal("coin flip requires a seed commitment".into())
                })?;
                Self::CoinFlip(CoinFlip::new(commitment))
            }
        })
    }

    #[must_use]
    pub fn game_type(&self) -> GameType {
        match self {
            Self::TicTacToe(g) => g.game_type(),
            Self::Connect4(g) => g.game_type(),
            Self::RockPaperScissors(g) => g.game_type(),
            Self::CoinFlip(g) => g.game_type(),
        }
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::TicTacToe(g) => g.outcome(),
            Self::Connect4(g) => g.outcome(),
            Self::RockPaperScissors(g) => g.outcome(),
            Self::CoinFlip(g) => g.outcome(),
        }
    }

    /// Dispatch `action` to the matching rules.
    pub fn apply(&self, actor: Seat, action: &GameAction) -> Result<(Self, Outcome)> {
        match (self, action) {
            (Self::TicTacToe(g), GameAction::Mark(a)) => {
                g.apply(actor, a).map(|(s, o)| (Self::TicTacToe(s), o))
            }
            (Self::Connect4(g), GameAction::Drop(a)) => {
                g.apply(actor, a).map(|(s, o)| (Self::Connect4(s), o))
            }
            (Self::RockPaperScissors(g), GameAction::Throw(a)) => {
                g.apply(actor, a).map(|(s, o)| (Self::RockPaperScissors(s), o))
            }
            (Self::CoinFlip(g), GameAction::Call(a)) => {
                g.apply(actor, a).map(|(s, o)| (Self::CoinFlip(s), o))
            }
            _ => Err(WagerError::ActionMismatch(self.game_type())),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode and require the payload to hold `game_type`.
    pub fn decode_as(game_type: GameType, bytes: &[u8]) -> Result<Self> {
        let state = Self::decode(bytes)?;
        if state.game_type() != game_type {
            return Err(WagerError::Serialization(format!(
                "game_data holds {}, expected {game_type}",
                state.game_type()
            )));
        }
        Ok(state)
    }
}
