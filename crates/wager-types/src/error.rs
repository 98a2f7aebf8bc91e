//! Error types for the wager escrow engine.
//!
//! All errors use the `WG_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Ledger administration errors
//! - 2xx: Funds errors
//! - 3xx: Game lifecycle errors
//! - 4xx: Game resolution (move legality) errors
//! - 5xx: Token transfer errors
//! - 8xx: Security errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{GameId, GameStatus, Principal};

/// Central error enum for all escrow and game operations.
#[derive(Debug, Error)]
pub enum WagerError {
    // =================================================================
    // Ledger Administration Errors (1xx)
    // =================================================================
    /// `initialize` was called on a ledger that already has state.
    #[error("WG_ERR_100: Ledger already initialized")]
    AlreadyInitialized,

    /// An operation was attempted before `initialize`.
    #[error("WG_ERR_101: Ledger not initialized")]
    NotInitialized,

    /// Fee above 10_000 basis points.
    #[error("WG_ERR_102: Invalid fee: {0} bps exceeds 10000")]
    InvalidFeeBps(u16),

    /// Caller is not allowed to perform this operation.
    #[error("WG_ERR_103: Unauthorized caller {caller}: {reason}")]
    Unauthorized { caller: Principal, reason: String },

    // =================================================================
    // Funds Errors (2xx)
    // =================================================================
    /// Caller cannot cover the stake (or a transfer leg cannot be covered).
    #[error("WG_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// A credit would overflow the account balance.
    #[error("WG_ERR_201: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Game Lifecycle Errors (3xx)
    // =================================================================
    /// Stake is zero, outside configured bounds, or its pot overflows.
    #[error("WG_ERR_300: Invalid wager: {reason}")]
    InvalidWager { reason: String },

    /// No record exists for this id.
    #[error("WG_ERR_301: Game not found: {0}")]
    GameNotFound(GameId),

    /// Join attempted on a game that is not Open.
    #[error("WG_ERR_302: {game_id} is not open (status {status})")]
    GameNotOpen { game_id: GameId, status: GameStatus },

    /// Settlement or a move attempted on a game that is not Active.
    #[error("WG_ERR_303: {game_id} is not active (status {status})")]
    GameNotActive { game_id: GameId, status: GameStatus },

    /// The creator tried to join their own game.
    #[error("WG_ERR_304: Cannot join your own game")]
    SelfJoin,

    /// Reported winner is neither player nor the draw sentinel.
    #[error("WG_ERR_305: Invalid winner {0}")]
    InvalidWinner(Principal),

    /// The record is already terminally closed.
    #[error("WG_ERR_306: {0} already settled")]
    AlreadySettled(GameId),

    /// `expire_game` called before `expires_at`.
    #[error("WG_ERR_307: {0} has not expired yet")]
    ExpiryNotReached(GameId),

    /// Join attempted after `expires_at`.
    #[error("WG_ERR_308: {0} has expired")]
    GameExpired(GameId),

    /// Opaque payload larger than the configured cap.
    #[error("WG_ERR_309: Game data too long: {len} bytes (max {max})")]
    GameDataTooLong { len: usize, max: usize },

    // =================================================================
    // Resolution Errors (4xx)
    // =================================================================
    /// A move that breaks the game's rules.
    #[error("WG_ERR_400: Illegal move: {reason}")]
    IllegalMove { reason: String },

    /// Turn-based game: the other seat must move.
    #[error("WG_ERR_401: Not your turn")]
    NotYourTurn,

    /// The rule state already produced a terminal outcome.
    #[error("WG_ERR_402: Game already resolved")]
    AlreadyResolved,

    /// Caller is neither the creator nor the opponent.
    #[error("WG_ERR_403: {0} is not a participant")]
    NotAParticipant(Principal),

    /// Action does not belong to the game's type.
    #[error("WG_ERR_404: Action does not match game type {0}")]
    ActionMismatch(crate::GameType),

    /// Coin reveal does not match the committed hash.
    #[error("WG_ERR_405: Coin reveal does not match commitment")]
    CommitmentMismatch,

    /// Settlement requested before the rules produced an outcome.
    #[error("WG_ERR_406: {0} has no terminal outcome yet")]
    NotResolved(GameId),

    // =================================================================
    // Transfer Errors (5xx)
    // =================================================================
    /// The token-transfer primitive rejected a leg.
    #[error("WG_ERR_500: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // Security Errors (8xx)
    // =================================================================
    /// Conservation invariant violated. Critical.
    #[error("WG_ERR_800: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    /// A receipt signature did not verify.
    #[error("WG_ERR_801: Invalid receipt signature")]
    InvalidSignature,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("WG_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("WG_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("WG_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("WG_ERR_903: I/O error: {0}")]
    Io(String),
}

impl WagerError {
    /// State-guard failures are recoverable by re-reading state and never
    /// imply a balance change.
    #[must_use]
    pub fn is_state_guard(&self) -> bool {
        matches!(
            self,
            Self::GameNotOpen { .. }
                | Self::GameNotActive { .. }
                | Self::AlreadySettled(_)
                | Self::ExpiryNotReached(_)
                | Self::GameExpired(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WagerError>;

impl From<std::io::Error> for WagerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WagerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
