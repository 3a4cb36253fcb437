//! State-change notifications.
//!
//! Every committed state change produces one [`AuctionEvent`]. The core
//! calls [`EventSink::notify`] strictly *after* committing the change, so
//! a sink can never observe — or roll back — uncommitted state. Identities
//! carried by an event are captured before any custody or funds transfer
//! completes.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, AuctionId, Timestamp};

/// How an auction closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionOutcome {
    /// No real bid was ever placed; the asset went back to the seller.
    NoBids,
    /// The winning payment settled to the seller; the asset awaits claim.
    Settled { winner: AccountId, price: Amount },
}

/// A state-change notification emitted by the registry, escrow, or engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    AssetMinted {
        asset: AssetId,
        owner: AccountId,
        name: String,
    },
    AssetTransferred {
        asset: AssetId,
        from: AccountId,
        to: AccountId,
    },
    AssetBurned {
        asset: AssetId,
        owner: AccountId,
    },
    AuctionCreated {
        auction: AuctionId,
        asset: AssetId,
        seller: AccountId,
        min_bid: Amount,
        end_time: Timestamp,
    },
    BidPlaced {
        auction: AuctionId,
        bidder: AccountId,
        amount: Amount,
        /// The displaced bidder and the exact amount returned, if a prior
        /// real bid existed.
        refunded: Option<(AccountId, Amount)>,
    },
    AuctionEnded {
        auction: AuctionId,
        outcome: AuctionOutcome,
    },
    AssetClaimed {
        auction: AuctionId,
        asset: AssetId,
        winner: AccountId,
    },
}

impl AuctionEvent {
    /// Stable kind string for log lines and journal entries.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssetMinted { .. } => "ASSET_MINTED",
            Self::AssetTransferred { .. } => "ASSET_TRANSFERRED",
            Self::AssetBurned { .. } => "ASSET_BURNED",
            Self::AuctionCreated { .. } => "AUCTION_CREATED",
            Self::BidPlaced { .. } => "BID_PLACED",
            Self::AuctionEnded { .. } => "AUCTION_ENDED",
            Self::AssetClaimed { .. } => "ASSET_CLAIMED",
        }
    }
}

impl std::fmt::Display for AuctionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Write-only observer interface.
///
/// `notify` is infallible by design: delivery problems are the sink's
/// concern and must never roll back committed state. Implementations must
/// not call back into the engine.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &AuctionEvent);
}

/// A sink that discards everything. Useful for embedders that do not
/// observe events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &AuctionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_are_stable() {
        let event = AuctionEvent::AssetMinted {
            asset: AssetId::new(),
            owner: AccountId::dummy(1),
            name: "Art1".into(),
        };
        assert_eq!(event.kind(), "ASSET_MINTED");

        let event = AuctionEvent::AuctionEnded {
            auction: AuctionId::new(),
            outcome: AuctionOutcome::NoBids,
        };
        assert_eq!(event.kind(), "AUCTION_ENDED");
    }

    #[test]
    fn serde_roundtrip() {
        let event = AuctionEvent::BidPlaced {
            auction: AuctionId::new(),
            bidder: AccountId::dummy(3),
            amount: Amount(200),
            refunded: Some((AccountId::dummy(2), Amount(150))),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: AuctionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn null_sink_accepts_events() {
        let sink = NullSink;
        sink.notify(&AuctionEvent::AssetBurned {
            asset: AssetId::new(),
            owner: AccountId::dummy(1),
        });
    }
}
