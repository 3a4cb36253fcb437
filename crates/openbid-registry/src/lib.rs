//! # openbid-registry
//!
//! **Asset Registry**: owns asset identity, immutable attributes, and the
//! exclusive custody slot. No dependency on the auction engine.
//!
//! ## Custody model
//!
//! Every asset has exactly one holder at any observable point: an account,
//! or an auction that has taken temporary custody. All mutations verify
//! the expected current holder before moving custody, and move it
//! atomically under the registry lock.
//!
//! ```text
//! mint ──▶ Account(creator) ──transfer──▶ Account(recipient)
//!                │  ▲
//!   hold_for_auction  release_from_auction
//!                ▼  │
//!            Auction(id)          burn destroys (accounts only)
//! ```

pub mod registry;

pub use registry::AssetRegistry;
