//! Escrow conservation invariant.
//!
//! Mathematical invariant enforced on every escrow:
//! ```text
//! deposited == released + balance
//! ```
//! Total value entering an escrow via deposits equals total value leaving
//! via refunds and takes plus whatever is still held. If this ever breaks,
//! something has gone catastrophically wrong upstream.

use openbid_types::{Amount, OpenbidError, Result};

/// Running totals for one escrow since it was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConservationTotals {
    /// Total value that entered via deposits.
    pub deposited: Amount,
    /// Total value that left via refunds and takes.
    pub released: Amount,
}

impl ConservationTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&mut self, amount: Amount) {
        self.deposited = self.deposited.saturating_add(amount);
    }

    pub fn record_release(&mut self, amount: Amount) {
        self.released = self.released.saturating_add(amount);
    }

    /// Check the invariant against the current held balance.
    ///
    /// # Errors
    /// Returns `ConservationViolation` if `deposited != released + balance`.
    pub fn verify(&self, balance: Amount) -> Result<()> {
        let expected = self.released.saturating_add(balance);
        if self.deposited != expected {
            return Err(OpenbidError::ConservationViolation {
                reason: format!(
                    "deposited {} != released {} + balance {}",
                    self.deposited, self.released, balance
                ),
            });
        }
        Ok(())
    }
}
