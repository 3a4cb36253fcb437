//! Error types for the OpenBid auction engine.
//!
//! All errors use the `OB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Asset / registry errors
//! - 2xx: Funds ledger errors
//! - 3xx: Escrow errors
//! - 4xx: Auction lifecycle errors
//! - 5xx: Bidding errors
//! - 9xx: General / internal errors
//!
//! Every failure is typed and caller-visible; no operation signals failure
//! through a sentinel value, and a failed operation leaves no partial state.

use thiserror::Error;

use crate::{AccountId, Amount, AssetId, AuctionId, EscrowId, Timestamp};

/// Central error enum for all OpenBid operations.
#[derive(Debug, Error)]
pub enum OpenbidError {
    // =================================================================
    // Asset / Registry Errors (1xx)
    // =================================================================
    /// The requested asset does not exist (or was burned).
    #[error("OB_ERR_100: Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// A creation parameter failed validation (empty text field at mint,
    /// zero bid floor or zero duration at auction creation).
    #[error("OB_ERR_101: Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The caller is not the current custodian (transfer/burn) or not the
    /// recorded winner (claim).
    #[error("OB_ERR_102: Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// The asset is held in custody by an in-progress auction.
    #[error("OB_ERR_103: Asset {asset} is in use by {auction}")]
    AssetInUse { asset: AssetId, auction: AuctionId },

    // =================================================================
    // Funds Ledger Errors (2xx)
    // =================================================================
    /// The payment source cannot cover a required withdrawal.
    #[error("OB_ERR_200: Insufficient funds for {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: AccountId,
        needed: Amount,
        available: Amount,
    },

    // =================================================================
    // Escrow Errors (3xx)
    // =================================================================
    /// The escrow handle does not exist.
    #[error("OB_ERR_300: Escrow not found: {0}")]
    EscrowNotFound(EscrowId),

    /// A refund or payout exceeds the escrowed balance.
    #[error("OB_ERR_301: Insufficient escrow: requested {requested}, balance {balance}")]
    InsufficientEscrow { requested: Amount, balance: Amount },

    /// Escrow conservation invariant violated — critical safety alert.
    #[error("OB_ERR_302: Escrow conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // Auction Lifecycle Errors (4xx)
    // =================================================================
    /// The requested auction does not exist.
    #[error("OB_ERR_400: Auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// A bid arrived at or after the deadline.
    #[error("OB_ERR_401: Auction expired: now {now}, ended at {end_time}")]
    Expired { now: Timestamp, end_time: Timestamp },

    /// Closure was attempted before the deadline.
    #[error("OB_ERR_402: Auction still active: now {now}, ends at {end_time}")]
    NotYetExpired { now: Timestamp, end_time: Timestamp },

    /// Closure was attempted a second time. Closure is not replayable.
    #[error("OB_ERR_403: Auction already ended: {0}")]
    AlreadyEnded(AuctionId),

    /// A claim arrived before the auction was closed.
    #[error("OB_ERR_404: Auction not yet ended: {0}")]
    NotYetEnded(AuctionId),

    /// The held-asset slot was already released.
    #[error("OB_ERR_405: Asset already claimed from {0}")]
    AlreadyClaimed(AuctionId),

    // =================================================================
    // Bidding Errors (5xx)
    // =================================================================
    /// The offered amount does not strictly exceed the current bid.
    #[error("OB_ERR_500: Bid too low: offered {offered}, current bid {current}")]
    BidTooLow { offered: Amount, current: Amount },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error (reserved for embedder ledger faults).
    #[error("OB_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpenbidError>;
