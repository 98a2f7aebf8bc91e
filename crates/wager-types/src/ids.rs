//! Identifiers used throughout the escrow engine.
//!
//! Principals use UUIDv7 for time-ordered sorting. Game ids come from the
//! ledger's monotonic counter, and escrow addresses are derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants;

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// An authenticated caller: a player, the ledger authority, an arbiter,
/// or the treasury owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Principal(pub Uuid);

impl Principal {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Game identifier. Equals the ledger's `total_games_created` counter at
/// the moment the game was created, so ids are unique and dense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The escrow account that holds this game's stakes.
    #[must_use]
    pub fn escrow_address(self) -> EscrowAddress {
        EscrowAddress::derive(self)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EscrowAddress
// ---------------------------------------------------------------------------

/// Program-owned escrow account address, deterministically derived from a
/// [`GameId`]. No player key can ever control it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EscrowAddress(pub [u8; 32]);

impl EscrowAddress {
    /// `SHA-256("wager:escrow:v1:" || game_id_le)`.
    #[must_use]
    pub fn derive(game_id: GameId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::ESCROW_SEED);
        hasher.update(game_id.0.to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for EscrowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "escrow:{}", hex::encode(&self.0[..8]))
    }
}

/// Type alias for token mint identifiers (e.g., "USDC").
pub type Mint = String;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
