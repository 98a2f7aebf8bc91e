//! Plays one game of each type against an in-memory ledger and logs every
//! lifecycle step.
//!
//! ```text
//! RUST_LOG=debug wager-demo [config.json]
//! ```

use std::process::ExitCode;

use chrono::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wager_escrow::{AccountKey, EscrowLedger, InMemoryTokens, ReceiptSigner, SharedLedger, TokenLedger};
use wager_games::{CoinSide, DropDisc, Hand, Mark};
use wager_session::{PlayerMove, SessionCoordinator};
use wager_types::{GameType, LedgerConfig, ManualClock, Principal, Result};

const MINT: &str = "USDC";
const FUNDING: u64 = 10_000_000;
const STAKE: u64 = 1_000_000;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            info!(path = %path, "Loading ledger config");
            LedgerConfig::from_json_file(path)?
        }
        None => LedgerConfig::default(),
    };

    let authority = Principal::new();
    let treasury = Principal::new();
    let arbiter = Principal::new();
    let alice = Principal::new();
    let bob = Principal::new();
    let clock = ManualClock::default();

    let mut ledger = EscrowLedger::new(
        config.clone(),
        InMemoryTokens::new(),
        clock.clone(),
        ReceiptSigner::generate(),
    )?;
    ledger.initialize(authority, treasury, config.fee_bps)?;
    ledger.register_arbiter(authority, arbiter)?;
    for p in [alice, bob] {
        ledger.tokens_mut().mint_to(AccountKey::Wallet(p), MINT, FUNDING)?;
    }

    let mut coordinator = SessionCoordinator::new(SharedLedger::new(ledger), arbiter)?;

    // Tic-tac-toe: alice takes the top row.
    let ttt = coordinator.open(alice, GameType::TicTacToe, MINT, STAKE)?;
    coordinator.join(bob, ttt)?;
    for (actor, row, col) in [(alice, 0, 0), (bob, 1, 0), (alice, 0, 1), (bob, 1, 1), (alice, 0, 2)] {
        coordinator.submit(ttt, actor, PlayerMove::Mark(Mark { row, col }))?;
    }

    // Connect 4: bob stacks column 3 after alice misplays.
    let c4 = coordinator.open(bob, GameType::Connect4, MINT, STAKE)?;
    coordinator.join(alice, c4)?;
    for (actor, column) in [(bob, 3), (alice, 0), (bob, 3), (alice, 6), (bob, 3), (alice, 0), (bob, 3)] {
        coordinator.submit(c4, actor, PlayerMove::Drop(DropDisc { column }))?;
    }

    // Rock-paper-scissors: three rounds, submissions in either order.
    let rps = coordinator.open(alice, GameType::RockPaperScissors, MINT, STAKE)?;
    coordinator.join(bob, rps)?;
    for (a, b) in [(Hand::Rock, Hand::Rock), (Hand::Paper, Hand::Scissors), (Hand::Scissors, Hand::Paper)] {
        coordinator.submit(rps, bob, PlayerMove::Throw(b))?;
        coordinator.submit(rps, alice, PlayerMove::Throw(a))?;
    }

    // Coin flip: bob calls heads against a committed coin.
    let flip = coordinator.open(alice, GameType::CoinFlip, MINT, STAKE)?;
    coordinator.join(bob, flip)?;
    coordinator.submit(flip, bob, PlayerMove::Call(CoinSide::Heads))?;

    // Alice withdraws a game nobody joined.
    let withdrawn = coordinator.open(alice, GameType::Connect4, MINT, STAKE)?;
    coordinator.cancel(alice, withdrawn)?;

    // An abandoned game is swept once its deadline passes.
    let abandoned = coordinator.open(bob, GameType::TicTacToe, MINT, STAKE)?;
    clock.advance(config.game_expiry() + Duration::seconds(1));
    let swept = coordinator.sweep_expired()?;
    info!(game_id = %abandoned, swept = swept.len(), "Abandoned games refunded");

    for session in coordinator.sessions() {
        if let Some(s) = session.settlement() {
            info!(
                game_id = %session.game_id(),
                game_type = %session.state().game_type(),
                outcome = %session.outcome(),
                kind = %s.kind,
                payout = s.payout,
                fee = s.fee,
                "Settled"
            );
        }
    }

    coordinator.ledger().with(|l| {
        l.verify_conservation(MINT)?;
        let state = l.state()?;
        info!(
            games = state.total_games_created,
            volume = state.total_volume,
            fees = state.total_fees_collected,
            receipts = l.receipts().len(),
            alice = l.tokens().balance(&AccountKey::Wallet(alice), MINT),
            bob = l.tokens().balance(&AccountKey::Wallet(bob), MINT),
            treasury = l.tokens().balance(&AccountKey::Wallet(treasury), MINT),
            "Ledger conserved"
        );
        Ok(())
    })
}
