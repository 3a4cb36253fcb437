//! # openbid-engine
//!
//! **Auction Engine**: the per-auction state machine over the asset
//! registry and escrow ledger.
//!
//! ## Architecture
//!
//! The engine sits between the caller surface and the two leaf planes:
//! 1. **`AssetRegistry`**: exclusive asset custody (openbid-registry)
//! 2. **`EscrowLedger`**: per-auction value custody (openbid-escrow)
//! 3. **`Clock`**: the external time oracle, read once per operation
//! 4. **`EventSink`**: write-only notification of committed changes
//!
//! ## Auction flow
//!
//! ```text
//! create_auction ──▶ custody to auction, escrow opened
//!   place_bid*   ──▶ prior bidder refunded, larger deposit escrowed
//!   end_auction  ──▶ payment settles to seller (or asset returns, no bids)
//!   claim_asset  ──▶ asset custody to winner, slot cleared
//! ```
//!
//! Operations on one auction serialize on that auction's own lock;
//! operations on different auctions run in parallel.

pub mod clock;
pub mod engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::AuctionHouse;
