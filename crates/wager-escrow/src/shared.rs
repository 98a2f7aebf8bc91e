//! Thread-safe handle over a single-writer [`EscrowLedger`].
//!
//! The mutex is the serialization point: two racing `join_game` calls on
//! the same game are applied one after the other, so exactly one of them
//! observes the game Open.

use std::sync::{Arc, Mutex, MutexGuard};

use wager_types::{Clock, GameId, GameType, Principal, Refund, Result, Settlement, WagerError, Winner};

use crate::ledger::EscrowLedger;
use crate::token::TokenLedger;

pub struct SharedLedger<T: TokenLedger, C: Clock> {
    inner: Arc<Mutex<EscrowLedger<T, C>>>,
}

impl<T: TokenLedger, C: Clock> Clone for SharedLedger<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TokenLedger, C: Clock> SharedLedger<T, C> {
    #[must_use]
    pub fn new(ledger: EscrowLedger<T, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EscrowLedger<T, C>>> {
        self.inner
            .lock()
            .map_err(|_| WagerError::Internal("ledger lock poisoned".into()))
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut EscrowLedger<T, C>) -> Result<R>) -> Result<R> {
        let mut guard = self.lock()?;
        f(&mut guard)
    }

    pub fn create_game(
        &self,
        caller: Principal,
        game_type: GameType,
        mint: &str,
        wager: u64,
        game_data: Vec<u8>,
    ) -> Result<GameId> {
        self.lock()?.create_game(caller, game_type, mint, wager, game_data)
    }

    pub fn join_game(&self, caller: Principal, game_id: GameId) -> Result<()> {
        self.lock()?.join_game(caller, game_id)
    }

    pub fn complete_game(&self, caller: Principal, game_id: GameId, winner: Winner) -> Result<Settlement> {
        self.lock()?.complete_game(caller, game_id, winner)
    }

    pub fn expire_game(&self, caller: Principal, game_id: GameId) -> Result<Refund> {
        self.lock()?.expire_game(caller, game_id)
    }

    pub fn cancel_game(&self, caller: Principal, game_id: GameId) -> Result<Refund> {
        self.lock()?.cancel_game(caller, game_id)
    }
}
