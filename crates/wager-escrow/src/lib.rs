//! # wager-escrow
//!
//! **Custody plane**: holds both players' stakes in a ledger-owned escrow
//! account from creation to settlement, then pays out atomically.
//!
//! ## Lifecycle
//!
//! 1. `create_game`: creator's stake → escrow (game OPEN)
//! 2. `join_game`: opponent's matching stake → escrow (game ACTIVE)
//! 3. `complete_game`: pot − fee → winner, fee → treasury (or refunds on a draw)
//! 4. `expire_game`: after the deadline, each depositor gets their stake back
//!
//! `cancel_game` lets a creator withdraw an OPEN game before anyone joins.
//!
//! Every transition appends a signed receipt, and conservation can be
//! checked at any time with [`EscrowLedger::verify_conservation`].
//!
//! The ledger never interprets game rules. It receives an opaque
//! [`wager_types::Winner`] from an authorized arbiter and nothing else.

pub mod conservation;
pub mod fee;
pub mod ledger;
pub mod shared;
pub mod signer;
pub mod token;

pub use conservation::SupplyConservation;
pub use fee::{PotSplit, pot_for, split_pot};
pub use ledger::EscrowLedger;
pub use shared::SharedLedger;
pub use signer::{ReceiptSigner, verify_receipt};
pub use token::{AccountKey, InMemoryTokens, TokenLedger, Transfer};
