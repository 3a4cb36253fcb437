//! The funds-ledger seam.
//!
//! The wallet or account-balance ledger that backs monetary value is an
//! external collaborator; the escrow system only needs these two
//! primitives. Implementations are the source of truth for account
//! balances.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use openbid_types::{AccountId, Amount, OpenbidError, Result};

/// External account-balance ledger.
///
/// `withdraw` is the only fallible direction: it must either remove the
/// full amount or leave the account unchanged. `credit` must accept the
/// funds unconditionally — a crediting failure is not a refusable event,
/// since by the time a credit happens the value has already left an
/// escrow.
pub trait FundsLedger: Send + Sync {
    /// Remove `amount` from `account`.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` (with `needed` and `available`) if the
    /// account cannot cover the amount.
    fn withdraw(&self, account: AccountId, amount: Amount) -> Result<()>;

    /// Add `amount` to `account`.
    fn credit(&self, account: AccountId, amount: Amount);
}

/// In-memory funds ledger. The reference `FundsLedger` implementation,
/// used by the test suites and by single-process embedders.
#[derive(Debug, Default)]
pub struct MemoryWallet {
    balances: Mutex<HashMap<AccountId, Amount>>,
}

impl MemoryWallet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account (increases its balance).
    pub fn deposit(&self, account: AccountId, amount: Amount) {
        let mut balances = self.lock();
        let entry = balances.entry(account).or_insert(Amount::ZERO);
        *entry = entry.saturating_add(amount);
    }

    /// Current balance of an account (zero if never funded).
    pub fn balance(&self, account: AccountId) -> Amount {
        self.lock().get(&account).copied().unwrap_or(Amount::ZERO)
    }

    /// Sum of all account balances.
    pub fn total(&self) -> Amount {
        self.lock()
            .values()
            .fold(Amount::ZERO, |acc, v| acc.saturating_add(*v))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AccountId, Amount>> {
        self.balances.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FundsLedger for MemoryWallet {
    fn withdraw(&self, account: AccountId, amount: Amount) -> Result<()> {
        let mut balances = self.lock();
        let available = balances.get(&account).copied().unwrap_or(Amount::ZERO);
        let Some(remaining) = available.checked_sub(amount) else {
            return Err(OpenbidError::InsufficientFunds {
                account,
                needed: amount,
                available,
            });
        };
        balances.insert(account, remaining);
        Ok(())
    }

    fn credit(&self, account: AccountId, amount: Amount) {
        let mut balances = self.lock();
        let entry = balances.entry(account).or_insert(Amount::ZERO);
        *entry = entry.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_increases_balance() {
        let wallet = MemoryWallet::new();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(1_000));
        assert_eq!(wallet.balance(alice), Amount(1_000));
    }

    #[test]
    fn withdraw_reduces_balance() {
        let wallet = MemoryWallet::new();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(1_000));
        wallet.withdraw(alice, Amount(400)).unwrap();
        assert_eq!(wallet.balance(alice), Amount(600));
    }

    #[test]
    fn withdraw_insufficient_fails_and_preserves_balance() {
        let wallet = MemoryWallet::new();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(100));

        let err = wallet.withdraw(alice, Amount(200)).unwrap_err();
        assert!(matches!(
            err,
            OpenbidError::InsufficientFunds {
                needed: Amount(200),
                available: Amount(100),
                ..
            }
        ));
        assert_eq!(wallet.balance(alice), Amount(100));
    }

    #[test]
    fn withdraw_from_unknown_account_fails() {
        let wallet = MemoryWallet::new();
        let err = wallet.withdraw(AccountId::dummy(9), Amount(1)).unwrap_err();
        assert!(matches!(err, OpenbidError::InsufficientFunds { .. }));
    }

    #[test]
    fn credit_creates_account() {
        let wallet = MemoryWallet::new();
        let bob = AccountId::dummy(2);
        wallet.credit(bob, Amount(50));
        assert_eq!(wallet.balance(bob), Amount(50));
    }

    #[test]
    fn total_sums_all_accounts() {
        let wallet = MemoryWallet::new();
        wallet.deposit(AccountId::dummy(1), Amount(300));
        wallet.deposit(AccountId::dummy(2), Amount(700));
        assert_eq!(wallet.total(), Amount(1_000));
    }
}
