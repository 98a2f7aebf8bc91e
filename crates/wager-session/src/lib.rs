//! # wager-session
//!
//! **Coordination plane**: binds each escrowed game to its live rule state
//! and relays resolved outcomes into settlement.
//!
//! ## Flow
//!
//! ```text
//! open → create_game (stake locked, initial state in game_data)
//! join → join_game   (second stake locked, game ACTIVE)
//! submit → GameState::apply → [terminal] → complete_game (as arbiter)
//! cancel → cancel_game (creator withdraws an OPEN game)
//! sweep_expired → expire_game for every game past its deadline
//! ```
//!
//! The coordinator is the only place where seats meet principals.

pub mod coordinator;

pub use coordinator::{PlayerMove, Session, SessionCoordinator};
