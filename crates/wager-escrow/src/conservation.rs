//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced after every settlement:
//! ```text
//! ∀ mint: Σ(wallets) + Σ(escrows) == Σ(issued)
//! ```
//!
//! Settlement only moves balances between accounts, so if this invariant
//! ever breaks, funds were created or destroyed somewhere.

use std::collections::HashMap;

use wager_types::{Mint, Result, WagerError};

/// Tracks per-mint issuance and validates conservation on demand.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    /// Total issued per mint since genesis.
    issued: HashMap<Mint, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_issue(&mut self, mint: &str, amount: u64) {
        *self.issued.entry(mint.to_string()).or_insert(0) += u128::from(amount);
    }

    #[must_use]
    pub fn expected_supply(&self, mint: &str) -> u128 {
        self.issued.get(mint).copied().unwrap_or(0)
    }

    /// Compare the actual supply (sum of all balances) against issuance.
    ///
    /// # Errors
    /// Returns [`WagerError::ConservationViolation`] if actual ≠ expected.
    pub fn verify(&self, mint: &str, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(mint);
        if actual_supply != expected {
            return Err(WagerError::ConservationViolation {
                reason: format!("Mint {mint}: actual supply {actual_supply} != issued {expected}"),
            });
        }
        Ok(())
    }
}
