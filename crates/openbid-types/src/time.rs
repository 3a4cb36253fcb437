//! Time values.
//!
//! Timestamps are unsigned milliseconds since the epoch of whatever clock
//! the embedder supplies; durations are plain `u64` milliseconds. The
//! engine only ever compares timestamps and adds durations, so the epoch
//! itself is irrelevant to correctness.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in time, in milliseconds since the clock's epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[must_use]
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Add a duration in milliseconds. `None` on overflow.
    #[must_use]
    pub fn checked_add_millis(self, millis: u64) -> Option<Self> {
        self.0.checked_add(millis).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_millis() {
        assert_eq!(
            Timestamp(1_000).checked_add_millis(500),
            Some(Timestamp(1_500))
        );
        assert_eq!(Timestamp(u64::MAX).checked_add_millis(1), None);
    }

    #[test]
    fn ordering_follows_millis() {
        assert!(Timestamp(500) < Timestamp(1_000));
    }
}
