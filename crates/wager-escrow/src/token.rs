//! Token-transfer primitive.
//!
//! The ledger moves funds only through [`TokenLedger::transfer_all`], an
//! atomic multi-leg transfer: either every leg lands or no balance changes.
//! [`InMemoryTokens`] is the in-process implementation used by the demo
//! binary and the tests.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wager_types::{EscrowAddress, Mint, Principal, Result, WagerError};

use crate::conservation::SupplyConservation;

/// A token-holding account: a principal's wallet or a game's escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AccountKey {
    Wallet(Principal),
    Escrow(EscrowAddress),
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet(p) => write!(f, "wallet:{p}"),
            Self::Escrow(e) => write!(f, "{e}"),
        }
    }
}

/// One leg of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountKey,
    pub to: AccountKey,
    pub mint: Mint,
    pub amount: u64,
}

impl Transfer {
    #[must_use]
    pub fn new(from: AccountKey, to: AccountKey, mint: &str, amount: u64) -> Self {
        Self {
            from,
            to,
            mint: mint.to_string(),
            amount,
        }
    }
}

/// Debit/credit primitive consumed by the escrow ledger.
pub trait TokenLedger {
    /// Current balance of `account` in `mint`; unknown accounts hold 0.
    fn balance(&self, account: &AccountKey, mint: &str) -> u64;

    /// Apply every leg or none of them. Errors propagate unchanged.
    fn transfer_all(&mut self, legs: &[Transfer]) -> Result<()>;

    /// Check that balances still sum to the issued supply of `mint`.
    fn verify_supply(&self, mint: &str) -> Result<()>;
}

/// In-memory balances keyed by `(account, mint)`.
///
/// Every mutation is atomic: legs are applied to a staged copy of the
/// touched entries and committed only when all of them succeed.
#[derive(Debug, Default)]
pub struct InMemoryTokens {
    balances: HashMap<(AccountKey, Mint), u64>,
    supply: SupplyConservation,
}

impl InMemoryTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue new tokens into `account`.
    pub fn mint_to(&mut self, account: AccountKey, mint: &str, amount: u64) -> Result<()> {
        let key = (account, mint.to_string());
        let current = self.balances.get(&key).copied().unwrap_or(0);
        let updated = current.checked_add(amount).ok_or(WagerError::BalanceOverflow)?;
        self.balances.insert(key, updated);
        self.supply.record_issue(mint, amount);
        Ok(())
    }

    /// Sum of every account's balance in `mint`.
    #[must_use]
    pub fn total_supply(&self, mint: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, m), _)| m == mint)
            .map(|(_, &amount)| u128::from(amount))
            .sum()
    }

    /// Accounts holding a non-zero balance of `mint`.
    #[must_use]
    pub fn holders(&self, mint: &str) -> Vec<(AccountKey, u64)> {
        let mut holders: Vec<(AccountKey, u64)> = self
            .balances
            .iter()
            .filter(|((_, m), amount)| m == mint && **amount > 0)
            .map(|((account, _), &amount)| (*account, amount))
            .collect();
        holders.sort();
        holders
    }
}

impl TokenLedger for InMemoryTokens {
    fn balance(&self, account: &AccountKey, mint: &str) -> u64 {
        self.balances
            .get(&(*account, mint.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer_all(&mut self, legs: &[Transfer]) -> Result<()> {
        let mut staged: HashMap<(AccountKey, Mint), u64> = HashMap::new();

        for leg in legs {
            if leg.amount == 0 {
                continue;
            }
            let from_key = (leg.from, leg.mint.clone());
            let from_balance = match staged.get(&from_key) {
                Some(&b) => b,
                None => self.balances.get(&from_key).copied().unwrap_or(0),
            };
            let debited = from_balance
                .checked_sub(leg.amount)
                .ok_or(WagerError::InsufficientFunds {
                    needed: leg.amount,
                    available: from_balance,
                })?;
            staged.insert(from_key, debited);

            let to_key = (leg.to, leg.mint.clone());
            let to_balance = match staged.get(&to_key) {
                Some(&b) => b,
                None => self.balances.get(&to_key).copied().unwrap_or(0),
            };
            let credited = to_balance
                .checked_add(leg.amount)
                .ok_or(WagerError::BalanceOverflow)?;
            staged.insert(to_key, credited);
        }

        // Commit
        self.balances.extend(staged);
        Ok(())
    }

    fn verify_supply(&self, mint: &str) -> Result<()> {
        self.supply.verify(mint, self.total_supply(mint))
    }
}
