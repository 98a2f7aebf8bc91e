//! Signed receipts for the ledger's audit trail.
//!
//! Every state-changing ledger operation produces a [`Receipt`] that can be
//! independently verified against the ledger's ed25519 public key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{GameId, GameType, Principal, Result, Settlement, constants};

/// The type of action this receipt proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptType {
    LedgerInitialized,
    GameCreated,
    GameJoined,
    GameCompleted,
    GameExpired,
    GameCancelled,
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LedgerInitialized => write!(f, "LEDGER_INITIALIZED"),
            Self::GameCreated => write!(f, "GAME_CREATED"),
            Self::GameJoined => write!(f, "GAME_JOINED"),
            Self::GameCompleted => write!(f, "GAME_COMPLETED"),
            Self::GameExpired => write!(f, "GAME_EXPIRED"),
            Self::GameCancelled => write!(f, "GAME_CANCELLED"),
        }
    }
}

/// The event a receipt commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    LedgerInitialized {
        authority: Principal,
        treasury: Principal,
        fee_bps: u16,
    },
    GameCreated {
        game_id: GameId,
        creator: Principal,
        game_type: GameType,
        wager_amount: u64,
        mint: String,
    },
    GameJoined {
        game_id: GameId,
        opponent: Principal,
    },
    GameCompleted(Settlement),
    GameExpired(Settlement),
    GameCancelled(Settlement),
}

impl LedgerEvent {
    #[must_use]
    pub fn receipt_type(&self) -> ReceiptType {
        match self {
            Self::LedgerInitialized { .. } => ReceiptType::LedgerInitialized,
            Self::GameCreated { .. } => ReceiptType::GameCreated,
            Self::GameJoined { .. } => ReceiptType::GameJoined,
            Self::GameCompleted(_) => ReceiptType::GameCompleted,
            Self::GameExpired(_) => ReceiptType::GameExpired,
            Self::GameCancelled(_) => ReceiptType::GameCancelled,
        }
    }

    #[must_use]
    pub fn game_id(&self) -> Option<GameId> {
        match self {
            Self::LedgerInitialized { .. } => None,
            Self::GameCreated { game_id, .. } | Self::GameJoined { game_id, .. } => Some(*game_id),
            Self::GameCompleted(s) | Self::GameExpired(s) | Self::GameCancelled(s) => {
                Some(s.game_id)
            }
        }
    }
}

/// A signed receipt proving that a ledger event occurred.
///
/// Receipts form an append-only audit trail. Each receipt includes:
/// - A SHA-256 hash of the serialized event
/// - An ed25519 signature from the ledger's key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_type: ReceiptType,
    pub game_id: Option<GameId>,
    /// JSON-serialized [`LedgerEvent`].
    pub payload: Vec<u8>,
    /// `SHA-256("wager:receipt:v1:" || payload)`.
    pub payload_hash: [u8; 32],
    /// Ed25519 signature over `payload_hash`.
    pub signature: Vec<u8>,
    /// Ed25519 public key of the issuing ledger.
    pub issuer: [u8; 32],
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    /// Domain-separated payload hash.
    #[must_use]
    pub fn hash_payload(payload: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::RECEIPT_SEED);
        hasher.update(payload);
        hasher.finalize().into()
    }

    /// The bytes that are signed: the payload hash.
    #[must_use]
    pub fn signing_bytes(&self) -> &[u8; 32] {
        &self.payload_hash
    }

    /// Whether `payload_hash` still matches `payload`.
    #[must_use]
    pub fn payload_intact(&self) -> bool {
        Self::hash_payload(&self.payload) == self.payload_hash
    }

    /// Decode the committed event.
    pub fn event(&self) -> Result<LedgerEvent> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}
