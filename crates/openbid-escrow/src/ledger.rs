//! Per-auction escrow containers.
//!
//! Every operation is atomic: the wallet withdrawal is the only fallible
//! step and always happens before any escrow state changes, so a failed
//! operation leaves both the wallet and the escrow exactly as they were.
//!
//! Escrows are independently lockable — operations on distinct escrows
//! never contend. The outer map lock is held only for lookup/insert.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use openbid_types::{AccountId, Amount, AuctionId, EscrowId, OpenbidError, Result};

use crate::conservation::ConservationTotals;
use crate::wallet::FundsLedger;

/// One escrow: the value held for a single auction, plus its running
/// conservation totals.
#[derive(Debug)]
struct EscrowAccount {
    auction: AuctionId,
    balance: Amount,
    totals: ConservationTotals,
}

/// Manages the escrow lifecycle: open, deposit, refund, payout.
#[derive(Debug, Default)]
pub struct EscrowLedger {
    escrows: RwLock<HashMap<EscrowId, Mutex<EscrowAccount>>>,
}

impl EscrowLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zero-balance escrow bound to one auction.
    pub fn open(&self, auction: AuctionId) -> EscrowId {
        let handle = EscrowId::new();
        self.write_map().insert(
            handle,
            Mutex::new(EscrowAccount {
                auction,
                balance: Amount::ZERO,
                totals: ConservationTotals::new(),
            }),
        );
        tracing::debug!(escrow = %handle, auction = %auction, "Escrow opened");
        handle
    }

    /// Raise the escrowed balance to `new_target`, withdrawing exactly the
    /// difference from `source`. A source that already funds the escrow
    /// only supplies the delta, never the full cumulative amount.
    ///
    /// Returns the delta actually withdrawn.
    ///
    /// # Errors
    /// - `EscrowNotFound` if the handle does not exist
    /// - `InvalidInput` if `new_target` is below the current balance
    /// - `InsufficientFunds` if `source` cannot cover the delta (escrow
    ///   unchanged)
    pub fn deposit_delta(
        &self,
        handle: EscrowId,
        new_target: Amount,
        source: AccountId,
        wallet: &dyn FundsLedger,
    ) -> Result<Amount> {
        self.with_escrow(handle, |escrow| {
            let Some(delta) = new_target.checked_sub(escrow.balance) else {
                return Err(OpenbidError::InvalidInput {
                    reason: format!(
                        "deposit target {new_target} below escrowed balance {}",
                        escrow.balance
                    ),
                });
            };
            wallet.withdraw(source, delta)?;
            escrow.balance = new_target;
            escrow.totals.record_deposit(delta);
            Ok(delta)
        })
    }

    /// Move exactly `amount` out of the escrow back to a displaced bidder.
    ///
    /// # Errors
    /// - `EscrowNotFound` if the handle does not exist
    /// - `InsufficientEscrow` if `amount` exceeds the balance
    pub fn refund(
        &self,
        handle: EscrowId,
        amount: Amount,
        recipient: AccountId,
        wallet: &dyn FundsLedger,
    ) -> Result<()> {
        self.release(handle, amount, recipient, wallet, "refund")
    }

    /// Settlement payout: move exactly `amount` out of the escrow to the
    /// seller. Same contract as [`refund`](Self::refund).
    ///
    /// # Errors
    /// - `EscrowNotFound` if the handle does not exist
    /// - `InsufficientEscrow` if `amount` exceeds the balance
    pub fn take(
        &self,
        handle: EscrowId,
        amount: Amount,
        recipient: AccountId,
        wallet: &dyn FundsLedger,
    ) -> Result<()> {
        self.release(handle, amount, recipient, wallet, "take")
    }

    /// Replace the escrowed funds with a new bidder's deposit.
    ///
    /// The new bidder's withdrawal happens first — if it fails, nothing
    /// changes. Only then is the old balance drained to `refund_to` and
    /// the new balance recorded, so the escrow never represents two
    /// bidders' funds at once: the balance moves old → 0 → new.
    ///
    /// Returns the amount refunded to the displaced bidder.
    ///
    /// # Errors
    /// - `EscrowNotFound` if the handle does not exist
    /// - `InsufficientFunds` if `new_source` cannot cover `new_amount`
    pub fn displace(
        &self,
        handle: EscrowId,
        refund_to: AccountId,
        new_source: AccountId,
        new_amount: Amount,
        wallet: &dyn FundsLedger,
    ) -> Result<Amount> {
        self.with_escrow(handle, |escrow| {
            wallet.withdraw(new_source, new_amount)?;

            let refunded = escrow.balance;
            escrow.balance = Amount::ZERO;
            escrow.totals.record_release(refunded);
            wallet.credit(refund_to, refunded);

            escrow.balance = new_amount;
            escrow.totals.record_deposit(new_amount);

            tracing::debug!(
                escrow = %handle,
                refunded = %refunded,
                new_balance = %new_amount,
                "Escrow displaced"
            );
            Ok(refunded)
        })
    }

    /// Current escrowed balance.
    pub fn balance(&self, handle: EscrowId) -> Result<Amount> {
        self.with_escrow(handle, |escrow| Ok(escrow.balance))
    }

    /// The auction this escrow is bound to.
    pub fn bound_auction(&self, handle: EscrowId) -> Result<AuctionId> {
        self.with_escrow(handle, |escrow| Ok(escrow.auction))
    }

    /// Check conservation for one escrow: everything deposited is either
    /// still held or was released.
    ///
    /// # Errors
    /// Returns `ConservationViolation` if the invariant is broken.
    pub fn verify(&self, handle: EscrowId) -> Result<()> {
        self.with_escrow(handle, |escrow| escrow.totals.verify(escrow.balance))
    }

    /// Number of escrows ever opened and still tracked.
    #[must_use]
    pub fn escrow_count(&self) -> usize {
        self.read_map().len()
    }

    fn release(
        &self,
        handle: EscrowId,
        amount: Amount,
        recipient: AccountId,
        wallet: &dyn FundsLedger,
        kind: &str,
    ) -> Result<()> {
        self.with_escrow(handle, |escrow| {
            let Some(remaining) = escrow.balance.checked_sub(amount) else {
                return Err(OpenbidError::InsufficientEscrow {
                    requested: amount,
                    balance: escrow.balance,
                });
            };
            escrow.balance = remaining;
            escrow.totals.record_release(amount);
            wallet.credit(recipient, amount);
            tracing::debug!(
                escrow = %handle,
                amount = %amount,
                recipient = %recipient,
                kind,
                "Escrow released"
            );
            Ok(())
        })
    }

    fn with_escrow<T>(
        &self,
        handle: EscrowId,
        f: impl FnOnce(&mut EscrowAccount) -> Result<T>,
    ) -> Result<T> {
        let map = self.read_map();
        let entry = map
            .get(&handle)
            .ok_or(OpenbidError::EscrowNotFound(handle))?;
        let mut escrow = entry.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut escrow)
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<EscrowId, Mutex<EscrowAccount>>> {
        self.escrows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, HashMap<EscrowId, Mutex<EscrowAccount>>> {
        self.escrows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::MemoryWallet;

    fn setup() -> (EscrowLedger, MemoryWallet, EscrowId) {
        let ledger = EscrowLedger::new();
        let wallet = MemoryWallet::new();
        let handle = ledger.open(AuctionId::new());
        (ledger, wallet, handle)
    }

    #[test]
    fn open_starts_at_zero() {
        let (ledger, _, handle) = setup();
        assert_eq!(ledger.balance(handle).unwrap(), Amount::ZERO);
        assert_eq!(ledger.escrow_count(), 1);
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn deposit_delta_withdraws_full_amount_from_empty() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(500));

        let delta = ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();
        assert_eq!(delta, Amount(150));
        assert_eq!(ledger.balance(handle).unwrap(), Amount(150));
        assert_eq!(wallet.balance(alice), Amount(350));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn deposit_delta_only_supplies_the_difference() {
        // A source raising its own position pays only the increment.
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(500));

        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();
        let delta = ledger
            .deposit_delta(handle, Amount(200), alice, &wallet)
            .unwrap();

        assert_eq!(delta, Amount(50));
        assert_eq!(ledger.balance(handle).unwrap(), Amount(200));
        assert_eq!(wallet.balance(alice), Amount(300));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn deposit_delta_insufficient_changes_nothing() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(100));

        let err = ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap_err();
        assert!(matches!(err, OpenbidError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance(handle).unwrap(), Amount::ZERO);
        assert_eq!(wallet.balance(alice), Amount(100));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn deposit_delta_below_balance_is_invalid() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(500));
        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();

        let err = ledger
            .deposit_delta(handle, Amount(100), alice, &wallet)
            .unwrap_err();
        assert!(matches!(err, OpenbidError::InvalidInput { .. }));
        assert_eq!(ledger.balance(handle).unwrap(), Amount(150));
    }

    #[test]
    fn refund_moves_exact_amount_out() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(500));
        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();

        ledger.refund(handle, Amount(150), alice, &wallet).unwrap();
        assert_eq!(ledger.balance(handle).unwrap(), Amount::ZERO);
        assert_eq!(wallet.balance(alice), Amount(500));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn refund_above_balance_fails() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        wallet.deposit(alice, Amount(500));
        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();

        let err = ledger
            .refund(handle, Amount(151), alice, &wallet)
            .unwrap_err();
        assert!(matches!(
            err,
            OpenbidError::InsufficientEscrow {
                requested: Amount(151),
                balance: Amount(150),
            }
        ));
        assert_eq!(ledger.balance(handle).unwrap(), Amount(150));
    }

    #[test]
    fn take_pays_out_to_recipient() {
        let (ledger, wallet, handle) = setup();
        let bidder = AccountId::dummy(1);
        let seller = AccountId::dummy(2);
        wallet.deposit(bidder, Amount(500));
        ledger
            .deposit_delta(handle, Amount(200), bidder, &wallet)
            .unwrap();

        ledger.take(handle, Amount(200), seller, &wallet).unwrap();
        assert_eq!(ledger.balance(handle).unwrap(), Amount::ZERO);
        assert_eq!(wallet.balance(seller), Amount(200));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn displace_refunds_old_and_holds_new() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        let carol = AccountId::dummy(3);
        wallet.deposit(alice, Amount(150));
        wallet.deposit(carol, Amount(300));
        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();

        let refunded = ledger
            .displace(handle, alice, carol, Amount(200), &wallet)
            .unwrap();

        assert_eq!(refunded, Amount(150));
        assert_eq!(ledger.balance(handle).unwrap(), Amount(200));
        assert_eq!(wallet.balance(alice), Amount(150));
        assert_eq!(wallet.balance(carol), Amount(100));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn displace_insufficient_new_source_changes_nothing() {
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        let carol = AccountId::dummy(3);
        wallet.deposit(alice, Amount(150));
        wallet.deposit(carol, Amount(100));
        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();

        let err = ledger
            .displace(handle, alice, carol, Amount(200), &wallet)
            .unwrap_err();
        assert!(matches!(err, OpenbidError::InsufficientFunds { .. }));

        // Prior bidder still escrowed, nobody refunded, nothing withdrawn.
        assert_eq!(ledger.balance(handle).unwrap(), Amount(150));
        assert_eq!(wallet.balance(alice), Amount::ZERO);
        assert_eq!(wallet.balance(carol), Amount(100));
        ledger.verify(handle).unwrap();
    }

    #[test]
    fn unknown_handle_errors() {
        let ledger = EscrowLedger::new();
        let wallet = MemoryWallet::new();
        let ghost = EscrowId::new();
        assert!(matches!(
            ledger.balance(ghost).unwrap_err(),
            OpenbidError::EscrowNotFound(_)
        ));
        assert!(matches!(
            ledger
                .refund(ghost, Amount(1), AccountId::dummy(1), &wallet)
                .unwrap_err(),
            OpenbidError::EscrowNotFound(_)
        ));
    }

    #[test]
    fn bound_auction_is_recorded() {
        let ledger = EscrowLedger::new();
        let auction = AuctionId::new();
        let handle = ledger.open(auction);
        assert_eq!(ledger.bound_auction(handle).unwrap(), auction);
    }

    #[test]
    fn full_cycle_conserves_value() {
        // Wallet total is invariant across deposit, displacement, payout.
        let (ledger, wallet, handle) = setup();
        let alice = AccountId::dummy(1);
        let carol = AccountId::dummy(3);
        let seller = AccountId::dummy(5);
        wallet.deposit(alice, Amount(1_000));
        wallet.deposit(carol, Amount(1_000));
        let initial = wallet.total();

        ledger
            .deposit_delta(handle, Amount(150), alice, &wallet)
            .unwrap();
        ledger
            .displace(handle, alice, carol, Amount(200), &wallet)
            .unwrap();
        ledger.take(handle, Amount(200), seller, &wallet).unwrap();

        ledger.verify(handle).unwrap();
        assert_eq!(ledger.balance(handle).unwrap(), Amount::ZERO);
        assert_eq!(
            wallet.total(),
            initial,
            "escrow must neither create nor destroy value"
        );
    }
}
