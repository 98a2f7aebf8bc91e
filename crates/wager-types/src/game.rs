//! # Game records and the ledger singleton
//!
//! ## Status Machine
//!
//! ```text
//!   ┌──────┐  join   ┌────────┐  complete  ┌───────────┐
//!   │ OPEN ├────────▶│ ACTIVE ├───────────▶│ COMPLETED │
//!   └──┬───┘         └───┬────┘            └───────────┘
//!      │ expire          │ expire
//!      ▼                 ▼
//!   ┌─────────────────────┐
//!   │       EXPIRED       │
//!   └─────────────────────┘
//! ```
//!
//! A record is append-only after creation except for exactly two
//! transitions: (opponent, ACTIVE) and (winner + settlement, COMPLETED) or
//! (settlement, EXPIRED). Each field pair is written together, once.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    EscrowAddress, GameId, Mint, Principal, Result, Seat, Settlement, WagerError, Winner,
};

/// Game types the engine knows rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    TicTacToe,
    Connect4,
    RockPaperScissors,
    CoinFlip,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicTacToe => write!(f, "TIC_TAC_TOE"),
            Self::Connect4 => write!(f, "CONNECT_4"),
            Self::RockPaperScissors => write!(f, "ROCK_PAPER_SCISSORS"),
            Self::CoinFlip => write!(f, "COIN_FLIP"),
        }
    }
}

/// Lifecycle status of a [`GameRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Creator staked; waiting for an opponent.
    Open,
    /// Both stakes in escrow; play in progress.
    Active,
    /// Settled by `complete_game`. Terminal.
    Completed,
    /// Refunded by `expire_game`. Terminal.
    Expired,
    /// Withdrawn by its creator before anyone joined. Terminal.
    Cancelled,
}

impl GameStatus {
    /// Whether `self → next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Active)
                | (Self::Active, Self::Completed)
                | (Self::Open | Self::Active, Self::Expired)
                | (Self::Open, Self::Cancelled)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Cancelled)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// One wagered game, keyed by [`GameId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub game_type: GameType,
    pub creator: Principal,
    /// `None` until joined. Set together with `status = Active`.
    pub opponent: Option<Principal>,
    /// Stake per player, in the mint's smallest unit.
    pub wager_amount: u64,
    pub token_mint: Mint,
    pub status: GameStatus,
    /// Opaque rule-state payload; the ledger never parses it.
    pub game_data: Vec<u8>,
    /// Set together with `status = Completed`.
    pub winner: Option<Winner>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub escrow: EscrowAddress,
    /// Set together with the terminal status.
    pub settlement: Option<Settlement>,
}

impl GameRecord {
    /// Fresh OPEN record. The escrow address is derived from `id`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        id: GameId,
        game_type: GameType,
        creator: Principal,
        wager_amount: u64,
        token_mint: Mint,
        game_data: Vec<u8>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            game_type,
            creator,
            opponent: None,
            wager_amount,
            token_mint,
            status: GameStatus::Open,
            game_data,
            winner: None,
            created_at,
            expires_at,
            escrow: id.escrow_address(),
            settlement: None,
        }
    }

    /// Number of stakes currently held in escrow (before settlement).
    #[must_use]
    pub fn stakes_deposited(&self) -> u64 {
        if self.opponent.is_some() { 2 } else { 1 }
    }

    /// Which seat `principal` occupies, if any.
    #[must_use]
    pub fn seat_of(&self, principal: Principal) -> Option<Seat> {
        if principal == self.creator {
            Some(Seat::Creator)
        } else if self.opponent == Some(principal) {
            Some(Seat::Opponent)
        } else {
            None
        }
    }

    /// The principal sitting in `seat`.
    #[must_use]
    pub fn principal_at(&self, seat: Seat) -> Option<Principal> {
        match seat {
            Seat::Creator => Some(self.creator),
            Seat::Opponent => self.opponent,
        }
    }

    #[must_use]
    pub fn is_participant(&self, principal: Principal) -> bool {
        self.seat_of(principal).is_some()
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// OPEN → ACTIVE, setting the opponent in the same step.
    pub fn mark_active(&mut self, opponent: Principal) -> Result<()> {
        if !self.status.can_transition_to(GameStatus::Active) || self.opponent.is_some() {
            return Err(WagerError::GameNotOpen {
                game_id: self.id,
                status: self.status,
            });
        }
        self.opponent = Some(opponent);
        self.status = GameStatus::Active;
        Ok(())
    }

    /// ACTIVE → COMPLETED, recording winner and settlement together.
    pub fn mark_completed(&mut self, winner: Winner, settlement: Settlement) -> Result<()> {
        if !self.status.can_transition_to(GameStatus::Completed) {
            return Err(WagerError::GameNotActive {
                game_id: self.id,
                status: self.status,
            });
        }
        self.winner = Some(winner);
        self.settlement = Some(settlement);
        self.status = GameStatus::Completed;
        Ok(())
    }

    /// OPEN/ACTIVE → EXPIRED, recording the refund.
    pub fn mark_expired(&mut self, settlement: Settlement) -> Result<()> {
        if !self.status.can_transition_to(GameStatus::Expired) {
            return Err(WagerError::AlreadySettled(self.id));
        }
        self.settlement = Some(settlement);
        self.status = GameStatus::Expired;
        Ok(())
    }

    /// OPEN → CANCELLED, recording the creator's refund.
    pub fn mark_cancelled(&mut self, settlement: Settlement) -> Result<()> {
        if !self.status.can_transition_to(GameStatus::Cancelled) {
            return Err(WagerError::GameNotOpen {
                game_id: self.id,
                status: self.status,
            });
        }
        self.settlement = Some(settlement);
        self.status = GameStatus::Cancelled;
        Ok(())
    }
}

/// Dummy record for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl GameRecord {
    pub fn dummy(id: GameId, creator: Principal, wager_amount: u64) -> Self {
        let now = Utc::now();
        Self::open(
            id,
            GameType::CoinFlip,
            creator,
            wager_amount,
            "USDC".to_string(),
            Vec::new(),
            now,
            now + chrono::Duration::hours(24),
        )
    }
}

/// The ledger singleton. Created once by `initialize`, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    /// Principal allowed to administer the ledger.
    pub authority: Principal,
    /// Owner of the account that receives platform fees.
    pub treasury: Principal,
    /// Platform fee, 0..=10_000.
    pub platform_fee_bps: u16,
    /// Monotonic counter; doubles as the next game id.
    pub total_games_created: u64,
    /// Sum of every stake ever deposited.
    pub total_volume: u64,
    /// Sum of every fee paid to the treasury.
    pub total_fees_collected: u64,
}

impl LedgerState {
    #[must_use]
    pub fn new(authority: Principal, treasury: Principal, platform_fee_bps: u16) -> Self {
        Self {
            authority,
            treasury,
            platform_fee_bps,
            total_games_created: 0,
            total_volume: 0,
            total_fees_collected: 0,
        }
    }

    /// Take the next game id and advance the counter.
    pub fn allocate_game_id(&mut self) -> GameId {
        let id = GameId(self.total_games_created);
        self.total_games_created += 1;
        id
    }
}
