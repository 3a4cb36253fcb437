//! The time-oracle seam.
//!
//! The engine reads the clock exactly once per operation and never caches
//! the value across operations. Expiry checks therefore always compare
//! against a freshly supplied "now".

use std::sync::atomic::{AtomicU64, Ordering};

use openbid_types::Timestamp;

/// Monotonic source of the current time, in milliseconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in milliseconds since the UNIX epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch system time clamps to zero rather than wrapping.
        Timestamp(u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default())
    }
}

/// A hand-driven clock for deterministic tests and simulations.
/// Time only moves when the caller advances it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now_ms: AtomicU64::new(start.0),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now_ms.store(now.0, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now_ms.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_non_decreasing() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_only_moves_when_told() {
        let clock = ManualClock::new(Timestamp(100));
        assert_eq!(clock.now(), Timestamp(100));
        assert_eq!(clock.now(), Timestamp(100));

        clock.advance(400);
        assert_eq!(clock.now(), Timestamp(500));

        clock.set(Timestamp(1_000));
        assert_eq!(clock.now(), Timestamp(1_000));
    }
}
