//! Monetary amounts.
//!
//! All values are unsigned integers in the smallest value unit of the
//! backing ledger (the engine never sees fractional money). Arithmetic is
//! checked: overflow surfaces as `None`, never wraps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A monetary amount in the smallest value unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Amount(pub u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub fn new(units: u64) -> Self {
        Self(units)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating addition. Used on the crediting side of transfers, where
    /// the total in circulation is bounded by prior withdrawals.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::new(1).is_zero());
    }

    #[test]
    fn checked_add_overflow_is_none() {
        assert_eq!(Amount(u64::MAX).checked_add(Amount(1)), None);
        assert_eq!(Amount(1).checked_add(Amount(2)), Some(Amount(3)));
    }

    #[test]
    fn checked_sub_underflow_is_none() {
        assert_eq!(Amount(1).checked_sub(Amount(2)), None);
        assert_eq!(Amount(5).checked_sub(Amount(2)), Some(Amount(3)));
    }

    #[test]
    fn ordering_follows_units() {
        assert!(Amount(100) < Amount(150));
        assert!(Amount(150) > Amount::ZERO);
    }

    #[test]
    fn serde_roundtrip() {
        let amt = Amount(12_345);
        let json = serde_json::to_string(&amt).unwrap();
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amt, back);
    }
}
