//! Session coordinator: the only component that knows both the rules and
//! the ledger.
//!
//! It holds one live [`GameState`] per game, maps principals to seats, and
//! relays the outcome its own rule state produced into `complete_game`
//! exactly once, acting as the ledger's registered arbiter. Callers never
//! name a winner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wager_escrow::{SharedLedger, TokenLedger};
use wager_games::{CoinCall, CoinSide, DropDisc, GameAction, GameState, Hand, Mark, coinflip};
use wager_types::{
    Clock, GameId, GameRecord, GameStatus, GameType, Outcome, Principal, Refund, Result,
    Settlement, WagerError, Winner,
};

/// A move as a player submits it. Coin calls carry only the side; the
/// coordinator attaches the seed reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMove {
    Mark(Mark),
    Drop(DropDisc),
    Throw(Hand),
    Call(CoinSide),
}

/// Live state of one game.
#[derive(Debug, Clone)]
pub struct Session {
    game_id: GameId,
    state: GameState,
    /// Secret coin seed; revealed in the call action.
    coin_seed: Option<[u8; 32]>,
    settlement: Option<Settlement>,
}

impl Session {
    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.state.outcome()
    }

    /// Settlement relayed for this game, once resolved.
    #[must_use]
    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    fn action(&self, mv: PlayerMove) -> Result<GameAction> {
        Ok(match mv {
            PlayerMove::Mark(m) => GameAction::Mark(m),
            PlayerMove::Drop(d) => GameAction::Drop(d),
            PlayerMove::Throw(h) => GameAction::Throw(h),
            PlayerMove::Call(side) => {
                let reveal = self
                    .coin_seed
                    .ok_or(WagerError::ActionMismatch(self.state.game_type()))?;
                GameAction::Call(CoinCall { side, reveal })
            }
        })
    }
}

pub struct SessionCoordinator<T: TokenLedger, C: Clock> {
    ledger: SharedLedger<T, C>,
    /// Principal the ledger authority registered as arbiter.
    arbiter: Principal,
    sessions: BTreeMap<GameId, Session>,
}

impl<T: TokenLedger, C: Clock> SessionCoordinator<T, C> {
    /// `arbiter` must already be registered with the ledger.
    pub fn new(ledger: SharedLedger<T, C>, arbiter: Principal) -> Result<Self> {
        let registered = ledger.with(|l| Ok(l.is_arbiter(arbiter) || l.state()?.authority == arbiter))?;
        if !registered {
            return Err(WagerError::Unauthorized {
                caller: arbiter,
                reason: "coordinator principal is not a registered arbiter".into(),
            });
        }
        Ok(Self {
            ledger,
            arbiter,
            sessions: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn ledger(&self) -> &SharedLedger<T, C> {
        &self.ledger
    }

    #[must_use]
    pub fn arbiter(&self) -> Principal {
        self.arbiter
    }

    /// Build the initial rule state, stake it on the ledger, bind a session.
    pub fn open(
        &mut self,
        creator: Principal,
        game_type: GameType,
        mint: &str,
        wager: u64,
    ) -> Result<GameId> {
        let coin_seed = (game_type == GameType::CoinFlip).then(rand::random::<[u8; 32]>);
        let state = GameState::new(game_type, coin_seed.as_ref().map(coinflip::commit))?;
        let game_data = state.encode()?;

        let game_id = self
            .ledger
            .create_game(creator, game_type, mint, wager, game_data)?;
        tracing::info!(
            game_id = %game_id,
            creator = %creator,
            game_type = %game_type,
            wager,
            commitment = ?coin_seed.as_ref().map(|s| hex::encode(coinflip::commit(s))),
            "Session opened"
        );
        self.sessions.insert(
            game_id,
            Session {
                game_id,
                state,
                coin_seed,
                settlement: None,
            },
        );
        Ok(game_id)
    }

    pub fn join(&mut self, opponent: Principal, game_id: GameId) -> Result<()> {
        self.session(game_id)?;
        self.ledger.join_game(opponent, game_id)?;
        tracing::info!(game_id = %game_id, opponent = %opponent, "Session joined");
        Ok(())
    }

    /// Creator withdraws a game nobody has joined.
    pub fn cancel(&mut self, creator: Principal, game_id: GameId) -> Result<Refund> {
        self.session(game_id)?;
        let refund = self.ledger.cancel_game(creator, game_id)?;
        self.record_settlement(game_id)?;
        tracing::info!(game_id = %game_id, creator = %creator, "Session cancelled");
        Ok(refund)
    }

    /// Apply one player's move. A terminal outcome is settled immediately.
    ///
    /// Moves past the game's deadline are refused; the game can only be
    /// expired from then on. If settlement fails after the rules resolved,
    /// the resolved state is kept and [`Self::resolve`] can relay it again.
    pub fn submit(&mut self, game_id: GameId, actor: Principal, mv: PlayerMove) -> Result<Outcome> {
        let (record, now) = self
            .ledger
            .with(|l| Ok((l.game(game_id)?.clone(), l.clock().now())))?;
        if record.status != GameStatus::Active {
            return Err(WagerError::GameNotActive {
                game_id,
                status: record.status,
            });
        }
        if record.is_expired_at(now) {
            tracing::warn!(game_id = %game_id, actor = %actor, "Move after deadline rejected");
            return Err(WagerError::GameExpired(game_id));
        }
        let seat = record
            .seat_of(actor)
            .ok_or(WagerError::NotAParticipant(actor))?;

        let session = self.session(game_id)?;
        let action = session.action(mv)?;
        let (next, outcome) = session.state.apply(seat, &action)?;
        tracing::debug!(game_id = %game_id, actor = %actor, seat = %seat, ?mv, outcome = %outcome, "Move applied");
        self.session_mut(game_id)?.state = next;

        if outcome.is_terminal() {
            self.resolve(game_id)?;
        }
        Ok(outcome)
    }

    /// Settle the outcome the session's rule state reached.
    ///
    /// Returns `None` when the game is already settled or refunded, and
    /// `NotResolved` while play is still in progress.
    pub fn resolve(&mut self, game_id: GameId) -> Result<Option<Settlement>> {
        let record = self.record(game_id)?;
        if record.status.is_terminal() {
            tracing::debug!(game_id = %game_id, status = %record.status, "Resolution already settled");
            return Ok(None);
        }
        let outcome = self.session(game_id)?.outcome();
        let winner = winner_for(&record, outcome)?;
        let settlement = self.ledger.complete_game(self.arbiter, game_id, winner)?;
        tracing::info!(
            game_id = %game_id,
            outcome = %outcome,
            payout = settlement.payout,
            fee = settlement.fee,
            "Session resolved"
        );
        if let Some(session) = self.sessions.get_mut(&game_id) {
            session.settlement = Some(settlement.clone());
        }
        Ok(Some(settlement))
    }

    /// Refund one game past its deadline. Repeat calls return the same refund.
    pub fn expire(&mut self, game_id: GameId) -> Result<Refund> {
        let refund = self.ledger.expire_game(self.arbiter, game_id)?;
        self.record_settlement(game_id)?;
        Ok(refund)
    }

    /// Expire every game whose deadline has passed.
    ///
    /// A game whose refund fails does not stop the sweep; the first such
    /// error is returned after every other game has been expired and
    /// recorded.
    pub fn sweep_expired(&mut self) -> Result<Vec<(GameId, Refund)>> {
        let arbiter = self.arbiter;
        let (refunds, failure) = self.ledger.with(|l| {
            let mut refunds = Vec::new();
            let mut failure = None;
            for id in l.expirable_games() {
                match l.expire_game(arbiter, id) {
                    Ok(refund) => refunds.push((id, refund)),
                    Err(e) => {
                        tracing::error!(game_id = %id, error = %e, "Expiry failed");
                        failure.get_or_insert(e);
                    }
                }
            }
            Ok((refunds, failure))
        })?;
        for (id, _) in &refunds {
            self.record_settlement(*id)?;
        }
        if !refunds.is_empty() {
            tracing::info!(expired = refunds.len(), "Expiry sweep");
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(refunds),
        }
    }

    /// Live rule state of a game.
    pub fn session(&self, game_id: GameId) -> Result<&Session> {
        self.sessions
            .get(&game_id)
            .ok_or(WagerError::GameNotFound(game_id))
    }

    #[must_use]
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    fn session_mut(&mut self, game_id: GameId) -> Result<&mut Session> {
        self.sessions
            .get_mut(&game_id)
            .ok_or(WagerError::GameNotFound(game_id))
    }

    fn record(&self, game_id: GameId) -> Result<GameRecord> {
        self.ledger.with(|l| l.game(game_id).cloned())
    }

    fn record_settlement(&mut self, game_id: GameId) -> Result<()> {
        let settlement = self.record(game_id)?.settlement;
        if let Some(session) = self.sessions.get_mut(&game_id) {
            session.settlement = settlement;
        }
        Ok(())
    }
}

impl<T: TokenLedger, C: Clock> std::fmt::Debug for SessionCoordinator<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("arbiter", &self.arbiter)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

/// Map a seat-level outcome onto the ledger's winner value.
fn winner_for(record: &GameRecord, outcome: Outcome) -> Result<Winner> {
    match outcome {
        Outcome::Unresolved => Err(WagerError::NotResolved(record.id)),
        Outcome::Draw => Ok(Winner::Draw),
        Outcome::Winner(seat) => record
            .principal_at(seat)
            .map(Winner::Player)
            .ok_or_else(|| WagerError::Internal(format!("{} has no {seat}", record.id))),
    }
}
