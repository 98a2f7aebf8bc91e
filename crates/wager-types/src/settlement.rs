//! Settlement model: the recorded fund movement that closes a game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GameId, Winner};

/// How a game's escrow was disbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementKind {
    /// Payout to the winner, fee to the treasury.
    Decisive,
    /// Each player got their stake back, fee waived.
    Draw,
    /// Abandoned game: each depositor refunded, fee waived.
    Expired,
    /// Creator withdrew an unjoined game: stake refunded, fee waived.
    Cancelled,
}

impl std::fmt::Display for SettlementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decisive => write!(f, "DECISIVE"),
            Self::Draw => write!(f, "DRAW"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Terminal fund movement for one game. Stored on the record so repeated
/// settlement calls can return it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub game_id: GameId,
    pub kind: SettlementKind,
    /// `None` only for expired games.
    pub winner: Option<Winner>,
    /// Escrow balance at settlement time.
    pub pot: u64,
    /// Amount paid to the winner (0 unless decisive).
    pub payout: u64,
    /// Amount paid to the treasury (0 unless decisive).
    pub fee: u64,
    /// Amount returned to the creator (draw / expiry).
    pub creator_refund: u64,
    /// Amount returned to the opponent (draw / expiry of an Active game).
    pub opponent_refund: Option<u64>,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Everything that left the escrow account.
    #[must_use]
    pub fn disbursed(&self) -> u64 {
        self.payout + self.fee + self.creator_refund + self.opponent_refund.unwrap_or(0)
    }

    /// Per-player refunds of a draw or expiry.
    #[must_use]
    pub fn refund(&self) -> Refund {
        Refund {
            creator: self.creator_refund,
            opponent: self.opponent_refund,
        }
    }
}

/// Output of `expire_game`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub creator: u64,
    /// `None` when the game expired before anyone joined.
    pub opponent: Option<u64>,
}
