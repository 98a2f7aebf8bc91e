//! The escrow ledger: custody of both stakes from creation to settlement.
//!
//! Every fund-moving operation follows the same shape:
//! 1. Check every guard (no state touched on failure)
//! 2. Build the settlement and its signed receipt
//! 3. Execute all transfer legs in one atomic `transfer_all`
//! 4. Commit the record transition and append the receipt
//!
//! If the transfer fails, nothing after it runs, so a failed operation
//! leaves balances, records and the audit trail exactly as they were.

use std::collections::{BTreeMap, BTreeSet};

use wager_types::{
    Clock, GameId, GameRecord, GameStatus, GameType, LedgerConfig, LedgerEvent, LedgerState,
    Principal, Receipt, Refund, Result, Settlement, SettlementKind, WagerError, Winner,
};

use crate::fee::{pot_for, split_pot};
use crate::signer::ReceiptSigner;
use crate::token::{AccountKey, TokenLedger, Transfer};

/// Single-writer escrow ledger over a token primitive `T` and clock `C`.
///
/// All mutations take `&mut self`; wrap in [`crate::SharedLedger`] to share
/// across threads.
pub struct EscrowLedger<T: TokenLedger, C: Clock> {
    config: LedgerConfig,
    state: Option<LedgerState>,
    games: BTreeMap<GameId, GameRecord>,
    arbiters: BTreeSet<Principal>,
    tokens: T,
    clock: C,
    signer: ReceiptSigner,
    receipts: Vec<Receipt>,
}

impl<T: TokenLedger, C: Clock> EscrowLedger<T, C> {
    /// Build an uninitialized ledger. Fails if `config` is invalid.
    pub fn new(config: LedgerConfig, tokens: T, clock: C, signer: ReceiptSigner) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
            games: BTreeMap::new(),
            arbiters: BTreeSet::new(),
            tokens,
            clock,
            signer,
            receipts: Vec::new(),
        })
    }

    // =================================================================
    // Administration
    // =================================================================

    /// Create the ledger singleton. Callable exactly once.
    pub fn initialize(&mut self, authority: Principal, treasury: Principal, fee_bps: u16) -> Result<()> {
        if self.state.is_some() {
            return Err(WagerError::AlreadyInitialized);
        }
        // Validates fee_bps the same way settlement will.
        split_pot(0, fee_bps)?;

        let receipt = self.sign(&LedgerEvent::LedgerInitialized {
            authority,
            treasury,
            fee_bps,
        })?;
        self.state = Some(LedgerState::new(authority, treasury, fee_bps));
        self.receipts.push(receipt);

        tracing::info!(
            authority = %authority,
            treasury = %treasury,
            fee_bps,
            issuer = hex::encode(self.signer.issuer()),
            "Ledger initialized"
        );
        Ok(())
    }

    /// Allow `arbiter` to call [`Self::complete_game`]. Authority only.
    pub fn register_arbiter(&mut self, caller: Principal, arbiter: Principal) -> Result<bool> {
        self.require_authority(caller, "only the authority registers arbiters")?;
        let added = self.arbiters.insert(arbiter);
        tracing::info!(arbiter = %arbiter, added, "Arbiter registered");
        Ok(added)
    }

    /// Remove an arbiter. Authority only.
    pub fn revoke_arbiter(&mut self, caller: Principal, arbiter: Principal) -> Result<bool> {
        self.require_authority(caller, "only the authority revokes arbiters")?;
        let removed = self.arbiters.remove(&arbiter);
        tracing::info!(arbiter = %arbiter, removed, "Arbiter revoked");
        Ok(removed)
    }

    // =================================================================
    // Game lifecycle
    // =================================================================

    /// Open a game and move the creator's stake into its escrow account.
    pub fn create_game(
        &mut self,
        caller: Principal,
        game_type: GameType,
        mint: &str,
        wager: u64,
        game_data: Vec<u8>,
    ) -> Result<GameId> {
        let state = self.state()?;
        self.check_wager(wager)?;
        if game_data.len() > self.config.max_game_data_len {
            return Err(WagerError::GameDataTooLong {
                len: game_data.len(),
                max: self.config.max_game_data_len,
            });
        }
        let total_volume = state
            .total_volume
            .checked_add(wager)
            .ok_or(WagerError::BalanceOverflow)?;

        let game_id = GameId(state.total_games_created);
        let now = self.clock.now();
        let record = GameRecord::open(
            game_id,
            game_type,
            caller,
            wager,
            mint.to_string(),
            game_data,
            now,
            now + self.config.game_expiry(),
        );
        let receipt = self.sign(&LedgerEvent::GameCreated {
            game_id,
            creator: caller,
            game_type,
            wager_amount: wager,
            mint: mint.to_string(),
        })?;

        self.tokens.transfer_all(&[Transfer::new(
            AccountKey::Wallet(caller),
            AccountKey::Escrow(record.escrow),
            mint,
            wager,
        )])?;

        // Commit
        let state = self.state_mut()?;
        let allocated = state.allocate_game_id();
        debug_assert_eq!(allocated, game_id);
        state.total_volume = total_volume;
        tracing::info!(
            game_id = %game_id,
            creator = %caller,
            game_type = %game_type,
            wager,
            mint,
            escrow = %record.escrow,
            expires_at = %record.expires_at,
            "Game created"
        );
        self.games.insert(game_id, record);
        self.receipts.push(receipt);
        Ok(game_id)
    }

    /// Take the open seat and move the opponent's matching stake into escrow.
    pub fn join_game(&mut self, caller: Principal, game_id: GameId) -> Result<()> {
        let state = self.state()?;
        let record = self.record(game_id)?;
        if record.status != GameStatus::Open {
            return Err(WagerError::GameNotOpen {
                game_id,
                status: record.status,
            });
        }
        if record.creator == caller {
            return Err(WagerError::SelfJoin);
        }
        if record.is_expired_at(self.clock.now()) {
            return Err(WagerError::GameExpired(game_id));
        }
        let wager = record.wager_amount;
        let leg = Transfer::new(
            AccountKey::Wallet(caller),
            AccountKey::Escrow(record.escrow),
            &record.token_mint,
            wager,
        );
        let total_volume = state
            .total_volume
            .checked_add(wager)
            .ok_or(WagerError::BalanceOverflow)?;
        let receipt = self.sign(&LedgerEvent::GameJoined {
            game_id,
            opponent: caller,
        })?;

        self.tokens.transfer_all(&[leg])?;

        // Commit
        self.record_mut(game_id)?.mark_active(caller)?;
        self.state_mut()?.total_volume = total_volume;
        self.receipts.push(receipt);
        tracing::info!(game_id = %game_id, opponent = %caller, wager, "Game joined");
        Ok(())
    }

    /// Pay out an Active game according to `winner`.
    ///
    /// Decisive: `pot - fee` to the winner, `fee` to the treasury. Draw: each
    /// player gets their stake back, no fee. Calling again on a Completed
    /// game returns the recorded settlement without moving funds.
    pub fn complete_game(
        &mut self,
        caller: Principal,
        game_id: GameId,
        winner: Winner,
    ) -> Result<Settlement> {
        let state = self.state()?.clone();
        let record = self.record(game_id)?;
        self.require_settler(caller, record)?;

        match record.status {
            GameStatus::Completed => {
                tracing::warn!(game_id = %game_id, caller = %caller, "Replayed completion ignored");
                return record
                    .settlement
                    .clone()
                    .ok_or_else(|| WagerError::Internal(format!("{game_id} completed without settlement")));
            }
            GameStatus::Expired | GameStatus::Cancelled => {
                tracing::warn!(game_id = %game_id, caller = %caller, status = %record.status, "Completion of refunded game rejected");
                return Err(WagerError::AlreadySettled(game_id));
            }
            GameStatus::Open => {
                tracing::warn!(game_id = %game_id, caller = %caller, "Completion of open game rejected");
                return Err(WagerError::GameNotActive {
                    game_id,
                    status: record.status,
                });
            }
            GameStatus::Active => {}
        }

        let opponent = record.opponent.ok_or_else(|| {
            WagerError::Internal(format!("{game_id} is active without an opponent"))
        })?;
        if let Winner::Player(p) = winner {
            if !record.is_participant(p) {
                tracing::warn!(game_id = %game_id, winner = %p, "Settlement to non-player rejected");
                return Err(WagerError::InvalidWinner(p));
            }
        }

        let mint = record.token_mint.clone();
        let escrow = AccountKey::Escrow(record.escrow);
        let pot = self.escrow_pot(record)?;

        let (settlement, legs) = match winner {
            Winner::Player(p) => {
                let split = split_pot(pot, state.platform_fee_bps)?;
                let mut legs = vec![Transfer::new(escrow, AccountKey::Wallet(p), &mint, split.payout)];
                if split.fee > 0 {
                    legs.push(Transfer::new(
                        escrow,
                        AccountKey::Wallet(state.treasury),
                        &mint,
                        split.fee,
                    ));
                }
                let settlement = Settlement {
                    game_id,
                    kind: SettlementKind::Decisive,
                    winner: Some(winner),
                    pot,
                    payout: split.payout,
                    fee: split.fee,
                    creator_refund: 0,
                    opponent_refund: None,
                    settled_at: self.clock.now(),
                };
                (settlement, legs)
            }
            Winner::Draw => {
                let stake = record.wager_amount;
                let legs = vec![
                    Transfer::new(escrow, AccountKey::Wallet(record.creator), &mint, stake),
                    Transfer::new(escrow, AccountKey::Wallet(opponent), &mint, stake),
                ];
                let settlement = Settlement {
                    game_id,
                    kind: SettlementKind::Draw,
                    winner: Some(winner),
                    pot,
                    payout: 0,
                    fee: 0,
                    creator_refund: stake,
                    opponent_refund: Some(stake),
                    settled_at: self.clock.now(),
                };
                (settlement, legs)
            }
        };
        let total_fees = state
            .total_fees_collected
            .checked_add(settlement.fee)
            .ok_or(WagerError::BalanceOverflow)?;
        let receipt = self.sign(&LedgerEvent::GameCompleted(settlement.clone()))?;

        self.tokens.transfer_all(&legs)?;

        // Commit
        self.record_mut(game_id)?
            .mark_completed(winner, settlement.clone())?;
        self.state_mut()?.total_fees_collected = total_fees;
        self.receipts.push(receipt);
        tracing::info!(
            game_id = %game_id,
            winner = %winner,
            pot,
            payout = settlement.payout,
            fee = settlement.fee,
            "Game completed"
        );
        Ok(settlement)
    }

    /// Refund an abandoned game once `now > expires_at`. Anyone may call.
    ///
    /// Calling again on an Expired game returns the recorded refund.
    pub fn expire_game(&mut self, caller: Principal, game_id: GameId) -> Result<Refund> {
        self.state()?;
        let record = self.record(game_id)?;
        match record.status {
            GameStatus::Expired => {
                tracing::debug!(game_id = %game_id, caller = %caller, "Replayed expiry ignored");
                return record
                    .settlement
                    .as_ref()
                    .map(Settlement::refund)
                    .ok_or_else(|| WagerError::Internal(format!("{game_id} expired without settlement")));
            }
            GameStatus::Completed | GameStatus::Cancelled => {
                return Err(WagerError::AlreadySettled(game_id));
            }
            GameStatus::Open | GameStatus::Active => {}
        }
        if !record.is_expired_at(self.clock.now()) {
            return Err(WagerError::ExpiryNotReached(game_id));
        }

        let mint = record.token_mint.clone();
        let escrow = AccountKey::Escrow(record.escrow);
        let stake = record.wager_amount;
        let pot = self.escrow_pot(record)?;
        let mut legs = vec![Transfer::new(escrow, AccountKey::Wallet(record.creator), &mint, stake)];
        if let Some(opponent) = record.opponent {
            legs.push(Transfer::new(escrow, AccountKey::Wallet(opponent), &mint, stake));
        }
        let settlement = Settlement {
            game_id,
            kind: SettlementKind::Expired,
            winner: None,
            pot,
            payout: 0,
            fee: 0,
            creator_refund: stake,
            opponent_refund: record.opponent.map(|_| stake),
            settled_at: self.clock.now(),
        };
        let receipt = self.sign(&LedgerEvent::GameExpired(settlement.clone()))?;

        self.tokens.transfer_all(&legs)?;

        // Commit
        let refund = settlement.refund();
        self.record_mut(game_id)?.mark_expired(settlement)?;
        self.receipts.push(receipt);
        tracing::info!(
            game_id = %game_id,
            caller = %caller,
            creator_refund = refund.creator,
            opponent_refund = ?refund.opponent,
            "Game expired"
        );
        Ok(refund)
    }

    /// Withdraw an Open game before anyone joins. Creator only; the stake
    /// is refunded in full.
    pub fn cancel_game(&mut self, caller: Principal, game_id: GameId) -> Result<Refund> {
        self.state()?;
        let record = self.record(game_id)?;
        if record.creator != caller {
            return Err(WagerError::Unauthorized {
                caller,
                reason: format!("only the creator may cancel {game_id}"),
            });
        }
        if record.status != GameStatus::Open {
            return Err(WagerError::GameNotOpen {
                game_id,
                status: record.status,
            });
        }

        let mint = record.token_mint.clone();
        let stake = record.wager_amount;
        let pot = self.escrow_pot(record)?;
        let leg = Transfer::new(
            AccountKey::Escrow(record.escrow),
            AccountKey::Wallet(caller),
            &mint,
            stake,
        );
        let settlement = Settlement {
            game_id,
            kind: SettlementKind::Cancelled,
            winner: None,
            pot,
            payout: 0,
            fee: 0,
            creator_refund: stake,
            opponent_refund: None,
            settled_at: self.clock.now(),
        };
        let receipt = self.sign(&LedgerEvent::GameCancelled(settlement.clone()))?;

        self.tokens.transfer_all(&[leg])?;

        // Commit
        let refund = settlement.refund();
        self.record_mut(game_id)?.mark_cancelled(settlement)?;
        self.receipts.push(receipt);
        tracing::info!(game_id = %game_id, creator = %caller, refund = stake, "Game cancelled");
        Ok(refund)
    }

    // =================================================================
    // Queries
    // =================================================================

    pub fn state(&self) -> Result<&LedgerState> {
        self.state.as_ref().ok_or(WagerError::NotInitialized)
    }

    pub fn game(&self, game_id: GameId) -> Result<&GameRecord> {
        self.record(game_id)
    }

    /// Games still waiting for an opponent and not yet past expiry.
    #[must_use]
    pub fn open_games(&self) -> Vec<&GameRecord> {
        let now = self.clock.now();
        self.games
            .values()
            .filter(|g| g.status == GameStatus::Open && !g.is_expired_at(now))
            .collect()
    }

    /// Non-terminal games whose expiry has passed.
    #[must_use]
    pub fn expirable_games(&self) -> Vec<GameId> {
        let now = self.clock.now();
        self.games
            .values()
            .filter(|g| !g.status.is_terminal() && g.is_expired_at(now))
            .map(|g| g.id)
            .collect()
    }

    pub fn escrow_balance(&self, game_id: GameId) -> Result<u64> {
        let record = self.record(game_id)?;
        Ok(self
            .tokens
            .balance(&AccountKey::Escrow(record.escrow), &record.token_mint))
    }

    #[must_use]
    pub fn is_arbiter(&self, principal: Principal) -> bool {
        self.arbiters.contains(&principal)
    }

    /// Append-only audit trail, oldest first.
    #[must_use]
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Public key that verifies this ledger's receipts.
    #[must_use]
    pub fn issuer(&self) -> [u8; 32] {
        self.signer.issuer()
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Mutable access to the token primitive, for funding wallets.
    pub fn tokens_mut(&mut self) -> &mut T {
        &mut self.tokens
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Check conservation for `mint`: total supply matches issuance, every
    /// live escrow holds exactly its deposited stakes, every settled escrow
    /// is empty, and every settlement disbursed its whole pot.
    pub fn verify_conservation(&self, mint: &str) -> Result<()> {
        self.tokens.verify_supply(mint)?;
        for record in self.games.values().filter(|g| g.token_mint == mint) {
            let held = self
                .tokens
                .balance(&AccountKey::Escrow(record.escrow), mint);
            let expected = if record.status.is_terminal() {
                0
            } else {
                record.wager_amount * record.stakes_deposited()
            };
            if held != expected {
                return Err(WagerError::ConservationViolation {
                    reason: format!(
                        "{} ({}) holds {held}, expected {expected}",
                        record.id, record.status
                    ),
                });
            }
            if let Some(settlement) = &record.settlement {
                if settlement.disbursed() != settlement.pot {
                    return Err(WagerError::ConservationViolation {
                        reason: format!(
                            "{} disbursed {} of pot {}",
                            record.id,
                            settlement.disbursed(),
                            settlement.pot
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    // =================================================================
    // Internals
    // =================================================================

    fn state_mut(&mut self) -> Result<&mut LedgerState> {
        self.state.as_mut().ok_or(WagerError::NotInitialized)
    }

    fn record(&self, game_id: GameId) -> Result<&GameRecord> {
        self.games
            .get(&game_id)
            .ok_or(WagerError::GameNotFound(game_id))
    }

    fn record_mut(&mut self, game_id: GameId) -> Result<&mut GameRecord> {
        self.games
            .get_mut(&game_id)
            .ok_or(WagerError::GameNotFound(game_id))
    }

    fn sign(&self, event: &LedgerEvent) -> Result<Receipt> {
        self.signer.issue(event, self.clock.now())
    }

    fn check_wager(&self, wager: u64) -> Result<()> {
        if wager == 0 {
            return Err(WagerError::InvalidWager {
                reason: "stake must be greater than zero".into(),
            });
        }
        if wager < self.config.min_wager {
            return Err(WagerError::InvalidWager {
                reason: format!("stake {wager} below minimum {}", self.config.min_wager),
            });
        }
        if let Some(max) = self.config.max_wager {
            if wager > max {
                return Err(WagerError::InvalidWager {
                    reason: format!("stake {wager} above maximum {max}"),
                });
            }
        }
        pot_for(wager)?;
        Ok(())
    }

    fn require_authority(&self, caller: Principal, reason: &str) -> Result<()> {
        if self.state()?.authority != caller {
            return Err(WagerError::Unauthorized {
                caller,
                reason: reason.into(),
            });
        }
        Ok(())
    }

    /// Settlement is reserved to the authority and registered arbiters, and
    /// never to a player of the game being settled.
    fn require_settler(&self, caller: Principal, record: &GameRecord) -> Result<()> {
        let state = self.state()?;
        if caller != state.authority && !self.arbiters.contains(&caller) {
            tracing::warn!(game_id = %record.id, caller = %caller, "Settlement by non-arbiter rejected");
            return Err(WagerError::Unauthorized {
                caller,
                reason: "not the authority or a registered arbiter".into(),
            });
        }
        if record.is_participant(caller) {
            tracing::warn!(game_id = %record.id, caller = %caller, "Settlement by player rejected");
            return Err(WagerError::Unauthorized {
                caller,
                reason: "players cannot settle their own game".into(),
            });
        }
        Ok(())
    }

    /// Escrow balance, cross-checked against the stakes the record says it
    /// holds.
    fn escrow_pot(&self, record: &GameRecord) -> Result<u64> {
        let pot = self
            .tokens
            .balance(&AccountKey::Escrow(record.escrow), &record.token_mint);
        let expected = record.wager_amount * record.stakes_deposited();
        if pot != expected {
            tracing::error!(
                game_id = %record.id,
                held = pot,
                expected,
                "Escrow balance does not match deposited stakes"
            );
            return Err(WagerError::ConservationViolation {
                reason: format!("{} escrow holds {pot}, expected {expected}", record.id),
            });
        }
        Ok(pot)
    }
}

impl<T: TokenLedger + std::fmt::Debug, C: Clock> std::fmt::Debug for EscrowLedger<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowLedger")
            .field("state", &self.state)
            .field("games", &self.games.len())
            .field("arbiters", &self.arbiters.len())
            .field("receipts", &self.receipts.len())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::verify_receipt;
    use crate::token::InMemoryTokens;
    use chrono::{Duration, Utc};
    use wager_types::{ManualClock, ReceiptType};

    const MINT: &str = "USDC";

    struct Fixture {
        ledger: EscrowLedger<InMemoryTokens, ManualClock>,
        clock: ManualClock,
        authority: Principal,
        treasury: Principal,
        alice: Principal,
        bob: Principal,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::new(Utc::now());
        let mut ledger = EscrowLedger::new(
            LedgerConfig::default(),
            InMemoryTokens::new(),
            clock.clone(),
            ReceiptSigner::generate(),
        )
        .unwrap();
        let (authority, treasury, alice, bob) =
            (Principal::new(), Principal::new(), Principal::new(), Principal::new());
        ledger.initialize(authority, treasury, 250).unwrap();
        for p in [alice, bob] {
            ledger
                .tokens_mut()
                .mint_to(AccountKey::Wallet(p), MINT, 10_000_000)
                .unwrap();
        }
        Fixture {
            ledger,
            clock,
            authority,
            treasury,
            alice,
            bob,
        }
    }

    fn wallet(f: &Fixture, p: Principal) -> u64 {
        f.ledger.tokens().balance(&AccountKey::Wallet(p), MINT)
    }

    fn active_game(f: &mut Fixture, wager: u64) -> GameId {
        let id = f
            .ledger
            .create_game(f.alice, GameType::TicTacToe, MINT, wager, Vec::new())
            .unwrap();
        f.ledger.join_game(f.bob, id).unwrap();
        id
    }

    #[test]
    fn initialize_once() {
        let mut f = fixture();
        let err = f
            .ledger
            .initialize(Principal::new(), Principal::new(), 100)
            .unwrap_err();
        assert!(matches!(err, WagerError::AlreadyInitialized));
        assert_eq!(f.ledger.state().unwrap().platform_fee_bps, 250);
        assert_eq!(f.ledger.state().unwrap().total_games_created, 0);
    }

    #[test]
    fn initialize_rejects_fee_above_100_percent() {
        let mut ledger = EscrowLedger::new(
            LedgerConfig::default(),
            InMemoryTokens::new(),
            ManualClock::default(),
            ReceiptSigner::generate(),
        )
        .unwrap();
        let err = ledger
            .initialize(Principal::new(), Principal::new(), 10_001)
            .unwrap_err();
        assert!(matches!(err, WagerError::InvalidFeeBps(10_001)));
        assert!(matches!(ledger.state().unwrap_err(), WagerError::NotInitialized));
    }

    #[test]
    fn create_before_initialize_fails() {
        let mut ledger = EscrowLedger::new(
            LedgerConfig::default(),
            InMemoryTokens::new(),
            ManualClock::default(),
            ReceiptSigner::generate(),
        )
        .unwrap();
        let err = ledger
            .create_game(Principal::new(), GameType::CoinFlip, MINT, 10, Vec::new())
            .unwrap_err();
        assert!(matches!(err, WagerError::NotInitialized));
    }

    #[test]
    fn create_locks_stake_and_assigns_sequential_ids() {
        let mut f = fixture();
        let a = f
            .ledger
            .create_game(f.alice, GameType::Connect4, MINT, 1_000, Vec::new())
            .unwrap();
        let b = f
            .ledger
            .create_game(f.alice, GameType::Connect4, MINT, 1_000, Vec::new())
            .unwrap();
        assert_eq!((a, b), (GameId(0), GameId(1)));
        assert_eq!(wallet(&f, f.alice), 10_000_000 - 2_000);
        assert_eq!(f.ledger.escrow_balance(a).unwrap(), 1_000);
        let state = f.ledger.state().unwrap();
        assert_eq!(state.total_games_created, 2);
        assert_eq!(state.total_volume, 2_000);
        let record = f.ledger.game(a).unwrap();
        assert_eq!(record.status, GameStatus::Open);
        assert_eq!(record.expires_at - record.created_at, Duration::seconds(86_400));
    }

    #[test]
    fn zero_wager_rejected() {
        let mut f = fixture();
        let err = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 0, Vec::new())
            .unwrap_err();
        assert!(matches!(err, WagerError::InvalidWager { .. }));
        assert_eq!(f.ledger.state().unwrap().total_games_created, 0);
    }

    #[test]
    fn overflowing_pot_rejected() {
        let mut f = fixture();
        let err = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, u64::MAX, Vec::new())
            .unwrap_err();
        assert!(matches!(err, WagerError::InvalidWager { .. }));
    }

    #[test]
    fn oversized_game_data_rejected() {
        let mut f = fixture();
        let err = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 10, vec![0; 1025])
            .unwrap_err();
        assert!(matches!(err, WagerError::GameDataTooLong { len: 1025, max: 1024 }));
    }

    #[test]
    fn underfunded_creator_rejected_without_side_effects() {
        let mut f = fixture();
        let poor = Principal::new();
        let err = f
            .ledger
            .create_game(poor, GameType::CoinFlip, MINT, 10, Vec::new())
            .unwrap_err();
        assert!(matches!(err, WagerError::InsufficientFunds { .. }));
        assert_eq!(f.ledger.state().unwrap().total_games_created, 0);
        assert!(f.ledger.game(GameId(0)).is_err());
        assert_eq!(f.ledger.receipts().len(), 1);
    }

    #[test]
    fn join_doubles_escrow() {
        let mut f = fixture();
        let id = active_game(&mut f, 1_000_000);
        assert_eq!(f.ledger.escrow_balance(id).unwrap(), 2_000_000);
        let record = f.ledger.game(id).unwrap();
        assert_eq!(record.status, GameStatus::Active);
        assert_eq!(record.opponent, Some(f.bob));
        assert!(f.ledger.open_games().is_empty());
    }

    #[test]
    fn self_join_rejected() {
        let mut f = fixture();
        let id = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 10, Vec::new())
            .unwrap();
        assert!(matches!(
            f.ledger.join_game(f.alice, id).unwrap_err(),
            WagerError::SelfJoin
        ));
    }

    #[test]
    fn second_join_rejected() {
        let mut f = fixture();
        let id = active_game(&mut f, 10);
        let carol = Principal::new();
        let err = f.ledger.join_game(carol, id).unwrap_err();
        assert!(matches!(
            err,
            WagerError::GameNotOpen {
                status: GameStatus::Active,
                ..
            }
        ));
    }

    #[test]
    fn join_after_expiry_rejected() {
        let mut f = fixture();
        let id = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 10, Vec::new())
            .unwrap();
        f.clock.advance(Duration::seconds(86_401));
        assert!(matches!(
            f.ledger.join_game(f.bob, id).unwrap_err(),
            WagerError::GameExpired(_)
        ));
        assert_eq!(wallet(&f, f.bob), 10_000_000);
    }

    #[test]
    fn join_unknown_game() {
        let mut f = fixture();
        assert!(matches!(
            f.ledger.join_game(f.bob, GameId(42)).unwrap_err(),
            WagerError::GameNotFound(GameId(42))
        ));
    }

    #[test]
    fn decisive_completion_pays_winner_and_treasury() {
        let mut f = fixture();
        let id = active_game(&mut f, 1_000_000);
        let settlement = f
            .ledger
            .complete_game(f.authority, id, Winner::Player(f.bob))
            .unwrap();
        assert_eq!(settlement.kind, SettlementKind::Decisive);
        assert_eq!(settlement.fee, 50_000);
        assert_eq!(settlement.payout, 1_950_000);
        assert_eq!(wallet(&f, f.bob), 10_000_000 - 1_000_000 + 1_950_000);
        assert_eq!(wallet(&f, f.alice), 10_000_000 - 1_000_000);
        assert_eq!(wallet(&f, f.treasury), 50_000);
        assert_eq!(f.ledger.escrow_balance(id).unwrap(), 0);
        assert_eq!(f.ledger.state().unwrap().total_fees_collected, 50_000);
        f.ledger.verify_conservation(MINT).unwrap();
    }

    #[test]
    fn draw_refunds_both_without_fee() {
        let mut f = fixture();
        let id = active_game(&mut f, 1_000);
        let settlement = f.ledger.complete_game(f.authority, id, Winner::Draw).unwrap();
        assert_eq!(settlement.kind, SettlementKind::Draw);
        assert_eq!(settlement.fee, 0);
        assert_eq!(wallet(&f, f.alice), 10_000_000);
        assert_eq!(wallet(&f, f.bob), 10_000_000);
        assert_eq!(wallet(&f, f.treasury), 0);
        assert_eq!(f.ledger.game(id).unwrap().winner, Some(Winner::Draw));
    }

    #[test]
    fn zero_fee_skips_treasury_leg() {
        let mut f = fixture();
        f.ledger.state_mut().unwrap().platform_fee_bps = 0;
        let id = active_game(&mut f, 500);
        let s = f
            .ledger
            .complete_game(f.authority, id, Winner::Player(f.alice))
            .unwrap();
        assert_eq!((s.payout, s.fee), (1_000, 0));
        assert_eq!(wallet(&f, f.treasury), 0);
    }

    #[test]
    fn completion_is_idempotent() {
        let mut f = fixture();
        let id = active_game(&mut f, 1_000);
        let first = f
            .ledger
            .complete_game(f.authority, id, Winner::Player(f.alice))
            .unwrap();
        let alice_after = wallet(&f, f.alice);
        let second = f
            .ledger
            .complete_game(f.authority, id, Winner::Player(f.bob))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(wallet(&f, f.alice), alice_after);
        assert_eq!(f.ledger.game(id).unwrap().winner, Some(Winner::Player(f.alice)));
    }

    #[test]
    fn completion_of_open_game_rejected() {
        let mut f = fixture();
        let id = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 10, Vec::new())
            .unwrap();
        assert!(matches!(
            f.ledger.complete_game(f.authority, id, Winner::Draw).unwrap_err(),
            WagerError::GameNotActive { .. }
        ));
    }

    #[test]
    fn non_player_winner_rejected() {
        let mut f = fixture();
        let id = active_game(&mut f, 10);
        let stranger = Principal::new();
        assert!(matches!(
            f.ledger
                .complete_game(f.authority, id, Winner::Player(stranger))
                .unwrap_err(),
            WagerError::InvalidWinner(p) if p == stranger
        ));
        assert_eq!(f.ledger.game(id).unwrap().status, GameStatus::Active);
    }

    #[test]
    fn only_arbiters_settle() {
        let mut f = fixture();
        let id = active_game(&mut f, 10);
        let outsider = Principal::new();
        assert!(matches!(
            f.ledger.complete_game(outsider, id, Winner::Draw).unwrap_err(),
            WagerError::Unauthorized { .. }
        ));
        assert!(matches!(
            f.ledger
                .complete_game(f.alice, id, Winner::Player(f.alice))
                .unwrap_err(),
            WagerError::Unauthorized { .. }
        ));

        let arbiter = Principal::new();
        assert!(f.ledger.register_arbiter(f.authority, arbiter).unwrap());
        f.ledger.complete_game(arbiter, id, Winner::Draw).unwrap();
    }

    #[test]
    fn player_arbiter_cannot_settle_own_game() {
        let mut f = fixture();
        f.ledger.register_arbiter(f.authority, f.bob).unwrap();
        let id = active_game(&mut f, 10);
        assert!(matches!(
            f.ledger
                .complete_game(f.bob, id, Winner::Player(f.bob))
                .unwrap_err(),
            WagerError::Unauthorized { .. }
        ));
    }

    #[test]
    fn arbiter_management_is_authority_only() {
        let mut f = fixture();
        let arbiter = Principal::new();
        assert!(matches!(
            f.ledger.register_arbiter(f.alice, arbiter).unwrap_err(),
            WagerError::Unauthorized { .. }
        ));
        f.ledger.register_arbiter(f.authority, arbiter).unwrap();
        assert!(f.ledger.is_arbiter(arbiter));
        assert!(f.ledger.revoke_arbiter(f.authority, arbiter).unwrap());
        assert!(!f.ledger.is_arbiter(arbiter));
        assert!(!f.ledger.revoke_arbiter(f.authority, arbiter).unwrap());
    }

    #[test]
    fn expiry_waits_for_deadline() {
        let mut f = fixture();
        let id = active_game(&mut f, 100);
        assert!(matches!(
            f.ledger.expire_game(f.bob, id).unwrap_err(),
            WagerError::ExpiryNotReached(_)
        ));
        // Exactly at the deadline is not yet past it.
        f.clock.advance(Duration::seconds(86_400));
        assert!(f.ledger.expire_game(f.bob, id).is_err());
        f.clock.advance(Duration::seconds(1));
        let refund = f.ledger.expire_game(f.bob, id).unwrap();
        assert_eq!(refund, Refund { creator: 100, opponent: Some(100) });
        assert_eq!(wallet(&f, f.alice), 10_000_000);
        assert_eq!(wallet(&f, f.bob), 10_000_000);
        assert_eq!(f.ledger.game(id).unwrap().status, GameStatus::Expired);
    }

    #[test]
    fn open_game_expiry_refunds_creator_only() {
        let mut f = fixture();
        let id = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 100, Vec::new())
            .unwrap();
        f.clock.advance(Duration::days(2));
        assert_eq!(f.ledger.expirable_games(), vec![id]);
        let refund = f.ledger.expire_game(Principal::new(), id).unwrap();
        assert_eq!(refund, Refund { creator: 100, opponent: None });
        assert!(f.ledger.expirable_games().is_empty());
        f.ledger.verify_conservation(MINT).unwrap();
    }

    #[test]
    fn expiry_is_idempotent_and_blocks_completion() {
        let mut f = fixture();
        let id = active_game(&mut f, 100);
        f.clock.advance(Duration::days(2));
        let first = f.ledger.expire_game(f.alice, id).unwrap();
        let second = f.ledger.expire_game(f.bob, id).unwrap();
        assert_eq!(first, second);
        assert_eq!(wallet(&f, f.alice), 10_000_000);
        assert!(matches!(
            f.ledger.complete_game(f.authority, id, Winner::Draw).unwrap_err(),
            WagerError::AlreadySettled(_)
        ));
    }

    #[test]
    fn completed_game_cannot_expire() {
        let mut f = fixture();
        let id = active_game(&mut f, 100);
        f.ledger.complete_game(f.authority, id, Winner::Draw).unwrap();
        f.clock.advance(Duration::days(2));
        assert!(matches!(
            f.ledger.expire_game(f.alice, id).unwrap_err(),
            WagerError::AlreadySettled(_)
        ));
    }

    #[test]
    fn creator_cancels_open_game() {
        let mut f = fixture();
        let id = f
            .ledger
            .create_game(f.alice, GameType::Connect4, MINT, 500, Vec::new())
            .unwrap();
        assert_eq!(wallet(&f, f.alice), 10_000_000 - 500);

        let refund = f.ledger.cancel_game(f.alice, id).unwrap();
        assert_eq!(refund, Refund { creator: 500, opponent: None });
        assert_eq!(wallet(&f, f.alice), 10_000_000);
        assert_eq!(f.ledger.escrow_balance(id).unwrap(), 0);
        let record = f.ledger.game(id).unwrap();
        assert_eq!(record.status, GameStatus::Cancelled);
        assert_eq!(
            record.settlement.as_ref().map(|s| s.kind),
            Some(SettlementKind::Cancelled)
        );
        assert!(f.ledger.open_games().is_empty());
        assert_eq!(
            f.ledger.receipts().last().unwrap().receipt_type,
            ReceiptType::GameCancelled
        );
        f.ledger.verify_conservation(MINT).unwrap();
    }

    #[test]
    fn only_creator_may_cancel() {
        let mut f = fixture();
        let id = f
            .ledger
            .create_game(f.alice, GameType::TicTacToe, MINT, 500, Vec::new())
            .unwrap();
        for caller in [f.bob, f.authority] {
            assert!(matches!(
                f.ledger.cancel_game(caller, id).unwrap_err(),
                WagerError::Unauthorized { .. }
            ));
        }
        assert_eq!(f.ledger.game(id).unwrap().status, GameStatus::Open);
        assert_eq!(f.ledger.escrow_balance(id).unwrap(), 500);
    }

    #[test]
    fn cancel_refused_once_not_open() {
        let mut f = fixture();
        let joined = active_game(&mut f, 100);
        assert!(matches!(
            f.ledger.cancel_game(f.alice, joined).unwrap_err(),
            WagerError::GameNotOpen { status: GameStatus::Active, .. }
        ));
        assert_eq!(f.ledger.escrow_balance(joined).unwrap(), 200);

        let cancelled = f
            .ledger
            .create_game(f.alice, GameType::CoinFlip, MINT, 100, Vec::new())
            .unwrap();
        f.ledger.cancel_game(f.alice, cancelled).unwrap();
        assert!(matches!(
            f.ledger.cancel_game(f.alice, cancelled).unwrap_err(),
            WagerError::GameNotOpen { status: GameStatus::Cancelled, .. }
        ));
        assert!(matches!(
            f.ledger.join_game(f.bob, cancelled).unwrap_err(),
            WagerError::GameNotOpen { .. }
        ));
        f.clock.advance(Duration::days(2));
        assert!(matches!(
            f.ledger.expire_game(f.bob, cancelled).unwrap_err(),
            WagerError::AlreadySettled(_)
        ));
        assert_eq!(f.ledger.expirable_games(), vec![joined]);
        assert_eq!(wallet(&f, f.alice), 10_000_000 - 100);
    }

    #[test]
    fn every_transition_is_receipted() {
        let mut f = fixture();
        let id = active_game(&mut f, 100);
        f.ledger
            .complete_game(f.authority, id, Winner::Player(f.alice))
            .unwrap();
        let kinds: Vec<ReceiptType> = f.ledger.receipts().iter().map(|r| r.receipt_type).collect();
        assert_eq!(
            kinds,
            vec![
                ReceiptType::LedgerInitialized,
                ReceiptType::GameCreated,
                ReceiptType::GameJoined,
                ReceiptType::GameCompleted,
            ]
        );
        for receipt in f.ledger.receipts() {
            verify_receipt(receipt).unwrap();
            assert_eq!(receipt.issuer, f.ledger.issuer());
        }
        let LedgerEvent::GameCompleted(s) = f.ledger.receipts()[3].event().unwrap() else {
            panic!("expected completion event");
        };
        assert_eq!(s.payout, 195);
    }

    #[test]
    fn wager_bounds_from_config() {
        let config = LedgerConfig {
            min_wager: 10,
            max_wager: Some(100),
            ..LedgerConfig::default()
        };
        let mut ledger = EscrowLedger::new(
            config,
            InMemoryTokens::new(),
            ManualClock::default(),
            ReceiptSigner::generate(),
        )
        .unwrap();
        let p = Principal::new();
        ledger.initialize(Principal::new(), Principal::new(), 0).unwrap();
        ledger.tokens_mut().mint_to(AccountKey::Wallet(p), MINT, 1_000).unwrap();
        for bad in [9, 101] {
            assert!(matches!(
                ledger.create_game(p, GameType::CoinFlip, MINT, bad, Vec::new()).unwrap_err(),
                WagerError::InvalidWager { .. }
            ));
        }
        ledger.create_game(p, GameType::CoinFlip, MINT, 100, Vec::new()).unwrap();
    }
}
