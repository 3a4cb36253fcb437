//! # Auction record — the per-auction state machine
//!
//! One record holds everything a single auction mutates. There is no
//! explicit "active" flag: `Created` and `Active` are the same stored
//! state, distinguished only by comparing the current time to `end_time`.
//!
//! ```text
//!   ┌────────────────┐  now >= end_time   ┌──────────────────┐
//!   │ CREATED/ACTIVE ├───────────────────▶│ ENDED            │
//!   └────────────────┘   end_auction      │  no-bid: asset   │
//!                                         │  returned, done  │
//!                                         │  settled: asset  │
//!                                         │  held for winner │
//!                                         └────────┬─────────┘
//!                                                  │ claim
//!                                                  ▼
//!                                         ┌──────────────────┐
//!                                         │ CLAIMED (slot    │
//!                                         │ cleared, final)  │
//!                                         └──────────────────┘
//! ```
//!
//! Invariants, at every observable point:
//! - `current_bid >= min_bid`
//! - the escrow balance equals `current_bid` iff a real bid exists
//!   (`highest_bidder != seller`), and zero otherwise
//! - `end_time` never changes after creation
//! - `ended` flips false → true exactly once
//! - the held-asset slot is released exactly once, on claim or on
//!   no-bid closure

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, AuctionId, EscrowId, Timestamp};

/// The mutable state of one auction. Owned exclusively by the engine;
/// every operation on it is serialized behind the auction's lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    /// Held-asset slot. Populated at creation, cleared exactly once: at
    /// winner claim, or at no-bid closure.
    pub asset: Option<AssetId>,
    pub seller: AccountId,
    /// The account credited with the winning offer. Equals `seller`
    /// until a real bid is placed.
    pub highest_bidder: AccountId,
    /// Current winning offer. Starts at `min_bid`.
    pub current_bid: Amount,
    /// Minimum acceptable bid floor. Immutable, nonzero.
    pub min_bid: Amount,
    pub created_at: Timestamp,
    /// `created_at + duration`. Immutable.
    pub end_time: Timestamp,
    /// The escrow bound to this auction.
    pub escrow: EscrowId,
    /// Flips false → true exactly once, at closure.
    pub ended: bool,
}

impl Auction {
    /// Whether a real bid has displaced the seller placeholder.
    #[must_use]
    pub fn has_real_bid(&self) -> bool {
        self.highest_bidder != self.seller
    }

    /// Whether the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.end_time
    }

    /// Whether the held asset is still waiting for a winner's claim.
    #[must_use]
    pub fn is_claimable(&self) -> bool {
        self.ended && self.asset.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_auction(seller: AccountId) -> Auction {
        Auction {
            id: AuctionId::new(),
            asset: Some(AssetId::new()),
            seller,
            highest_bidder: seller,
            current_bid: Amount(100),
            min_bid: Amount(100),
            created_at: Timestamp(0),
            end_time: Timestamp(1_000),
            escrow: EscrowId::new(),
            ended: false,
        }
    }

    #[test]
    fn fresh_auction_has_no_real_bid() {
        let auction = make_auction(AccountId::dummy(1));
        assert!(!auction.has_real_bid());
    }

    #[test]
    fn bidder_displaces_seller_placeholder() {
        let mut auction = make_auction(AccountId::dummy(1));
        auction.highest_bidder = AccountId::dummy(2);
        auction.current_bid = Amount(150);
        assert!(auction.has_real_bid());
    }

    #[test]
    fn expiry_is_inclusive_of_end_time() {
        let auction = make_auction(AccountId::dummy(1));
        assert!(!auction.is_expired(Timestamp(999)));
        assert!(auction.is_expired(Timestamp(1_000)));
        assert!(auction.is_expired(Timestamp(1_001)));
    }

    #[test]
    fn claimable_requires_ended_and_held_asset() {
        let mut auction = make_auction(AccountId::dummy(1));
        assert!(!auction.is_claimable());
        auction.ended = true;
        assert!(auction.is_claimable());
        auction.asset = None;
        assert!(!auction.is_claimable());
    }
}
