//! # wager-types
//!
//! Shared types, errors, and configuration for the **wager** escrow engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Principal`], [`GameId`], [`EscrowAddress`], [`Mint`]
//! - **Game records**: [`GameRecord`], [`GameType`], [`GameStatus`], [`LedgerState`]
//! - **Outcomes**: [`Seat`], [`Outcome`], [`Winner`]
//! - **Settlement model**: [`Settlement`], [`SettlementKind`], [`Refund`]
//! - **Audit trail**: [`Receipt`], [`ReceiptType`], [`LedgerEvent`]
//! - **Time**: [`Clock`], [`SystemClock`], [`ManualClock`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`WagerError`] with `WG_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod ids;
pub mod outcome;
pub mod receipt;
pub mod settlement;

// Re-export all primary types at crate root for ergonomic imports:
//   use wager_types::{GameRecord, GameStatus, Winner, ...};

pub use clock::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use ids::*;
pub use outcome::*;
pub use receipt::*;
pub use settlement::*;

// Constants are accessed via `wager_types::constants::FOO`
// (not re-exported to avoid name collisions).
