//! Resolution outcomes and the winner value relayed into settlement.
//!
//! Game rules speak in [`Seat`]s; the escrow ledger speaks in [`Winner`]s.
//! The session coordinator translates one into the other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Principal;

/// A player's position in a two-player game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// The player who opened the game and staked first. Moves first in
    /// turn-based games.
    Creator,
    /// The player who joined.
    Opponent,
}

impl Seat {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Creator => Self::Opponent,
            Self::Opponent => Self::Creator,
        }
    }

    /// Stable index for two-element per-seat arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Creator => 0,
            Self::Opponent => 1,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creator => write!(f, "CREATOR"),
            Self::Opponent => write!(f, "OPPONENT"),
        }
    }
}

/// Result of applying an action to a game's rule state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Play continues.
    Unresolved,
    /// The seat won.
    Winner(Seat),
    /// Nobody won; stakes are returned.
    Draw,
}

impl Outcome {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "UNRESOLVED"),
            Self::Winner(seat) => write!(f, "WINNER({seat})"),
            Self::Draw => write!(f, "DRAW"),
        }
    }
}

/// Winner reported to `complete_game`: a player principal or the draw
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    Player(Principal),
    Draw,
}

impl Winner {
    #[must_use]
    pub fn principal(self) -> Option<Principal> {
        match self {
            Self::Player(p) => Some(p),
            Self::Draw => None,
        }
    }

    #[must_use]
    pub fn is_draw(self) -> bool {
        matches!(self, Self::Draw)
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(p) => write!(f, "{p}"),
            Self::Draw => write!(f, "DRAW"),
        }
    }
}
