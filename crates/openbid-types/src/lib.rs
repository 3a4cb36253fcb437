//! # openbid-types
//!
//! Shared types, errors, and events for the **OpenBid** auction engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AssetId`], [`AuctionId`], [`AccountId`], [`EscrowId`]
//! - **Units**: [`Amount`] (smallest-unit money), [`Timestamp`] (milliseconds)
//! - **Asset model**: [`Asset`], [`Holder`]
//! - **Auction model**: [`Auction`]
//! - **Events**: [`AuctionEvent`], [`AuctionOutcome`], the [`EventSink`]
//!   trait, and the bundled [`EventJournal`] / [`NullSink`] implementations
//! - **Errors**: [`OpenbidError`] with `OB_ERR_` prefix codes

pub mod amount;
pub mod asset;
pub mod auction;
pub mod error;
pub mod event;
pub mod ids;
pub mod journal;
pub mod time;

// Re-export all primary types at crate root for ergonomic imports:
//   use openbid_types::{Asset, Auction, AuctionEvent, OpenbidError, ...};

pub use amount::*;
pub use asset::*;
pub use auction::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use journal::*;
pub use time::*;
