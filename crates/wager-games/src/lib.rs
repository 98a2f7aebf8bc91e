//! # wager-games
//!
//! **Pure deterministic game rules for wagered two-player games.**
//!
//! This is the resolution plane. It takes a rule state and one player
//! action and produces the next state plus an [`Outcome`]. It has:
//!
//! - **Zero side effects**: no balances, no escrow, no clocks
//! - **Deterministic output**: same state + action → same result
//! - **Seat-based**: rules know `Creator` and `Opponent`, never principals
//!
//! Four game types implement [`GameRules`]; [`GameState`] is the tagged
//! union the session coordinator stores and serializes into a record's
//! opaque `game_data`.
//!
//! [`Outcome`]: wager_types::Outcome

pub mod coinflip;
pub mod connect4;
pub mod rps;
pub mod rules;
pub mod state;
pub mod tictactoe;

pub use coinflip::{CoinCall, CoinFlip, CoinSide};
pub use connect4::{Connect4, DropDisc};
pub use rps::{Hand, RockPaperScissors, RoundResult};
pub use rules::GameRules;
pub use state::{GameAction, GameState};
pub use tictactoe::{Mark, TicTacToe};
