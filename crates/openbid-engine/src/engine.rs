//! The auction house: per-auction state machine over registry and escrow.
//!
//! Every operation on one auction is serialized behind that auction's own
//! mutex; the outer map lock is held only for lookup and insert, so
//! operations on different auctions proceed in parallel. Lock order is
//! always auction mutex first, then registry/escrow internal locks, and no
//! operation ever holds two auction mutexes.
//!
//! Each operation is a bounded synchronous unit: read the clock once,
//! validate, mutate, emit. A failed validation leaves balances, custody,
//! and flags exactly as before the call. Notifications are emitted after
//! the state change is committed, while the auction mutex is still held,
//! so a sink observes events in commit order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use openbid_escrow::{EscrowLedger, FundsLedger};
use openbid_registry::AssetRegistry;
use openbid_types::{
    AccountId, Amount, AssetId, Auction, AuctionEvent, AuctionId, AuctionOutcome, EventSink,
    OpenbidError, Result,
};

use crate::clock::Clock;

/// The engine facade. One handle serves the whole external surface:
/// asset operations pass through to the registry, auction operations run
/// the state machine.
pub struct AuctionHouse {
    registry: Arc<AssetRegistry>,
    escrow: Arc<EscrowLedger>,
    wallet: Arc<dyn FundsLedger>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    auctions: RwLock<HashMap<AuctionId, Arc<Mutex<Auction>>>>,
}

impl AuctionHouse {
    #[must_use]
    pub fn new(
        registry: Arc<AssetRegistry>,
        escrow: Arc<EscrowLedger>,
        wallet: Arc<dyn FundsLedger>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            escrow,
            wallet,
            clock,
            sink,
            auctions: RwLock::new(HashMap::new()),
        }
    }

    // -----------------------------------------------------------------
    // Asset surface (pass-through to the registry)
    // -----------------------------------------------------------------

    /// Mint a new asset into the creator's custody.
    ///
    /// # Errors
    /// Returns `InvalidInput` if any descriptive field is empty.
    pub fn mint(
        &self,
        name: &str,
        description: &str,
        image_ref: &str,
        creator: AccountId,
    ) -> Result<AssetId> {
        self.registry.mint(name, description, image_ref, creator)
    }

    /// Transfer asset custody from `caller` to `recipient`.
    ///
    /// # Errors
    /// See [`AssetRegistry::transfer`].
    pub fn transfer(&self, asset: AssetId, recipient: AccountId, caller: AccountId) -> Result<()> {
        self.registry.transfer(asset, recipient, caller)
    }

    /// Permanently destroy an asset.
    ///
    /// # Errors
    /// See [`AssetRegistry::burn`].
    pub fn burn(&self, asset: AssetId, caller: AccountId) -> Result<()> {
        self.registry.burn(asset, caller)
    }

    // -----------------------------------------------------------------
    // Auction surface
    // -----------------------------------------------------------------

    /// Open an auction for an asset the seller holds.
    ///
    /// Takes custody of the asset, opens a zero-balance escrow, and
    /// initializes the record with `highest_bidder = seller` and
    /// `current_bid = min_bid` (the seller placeholder meaning "no real
    /// bid yet").
    ///
    /// # Errors
    /// - `InvalidInput` if `min_bid` or `duration_ms` is zero, or the end
    ///   time overflows
    /// - `AssetNotFound` / `AssetInUse` / `Unauthorized` from the custody
    ///   hand-off
    pub fn create_auction(
        &self,
        asset: AssetId,
        min_bid: Amount,
        duration_ms: u64,
        seller: AccountId,
    ) -> Result<AuctionId> {
        if min_bid.is_zero() {
            return Err(OpenbidError::InvalidInput {
                reason: "minimum bid must be nonzero".into(),
            });
        }
        if duration_ms == 0 {
            return Err(OpenbidError::InvalidInput {
                reason: "auction duration must be nonzero".into(),
            });
        }

        let now = self.clock.now();
        let end_time = now
            .checked_add_millis(duration_ms)
            .ok_or_else(|| OpenbidError::InvalidInput {
                reason: "auction end time overflows".into(),
            })?;

        let id = AuctionId::new();
        self.registry.hold_for_auction(asset, id, seller)?;
        let escrow = self.escrow.open(id);

        let auction = Auction {
            id,
            asset: Some(asset),
            seller,
            highest_bidder: seller,
            current_bid: min_bid,
            min_bid,
            created_at: now,
            end_time,
            escrow,
            ended: false,
        };
        self.write_auctions()
            .insert(id, Arc::new(Mutex::new(auction)));

        tracing::info!(
            auction = %id,
            asset = %asset,
            seller = %seller,
            min_bid = %min_bid,
            end_time = %end_time,
            "Auction created"
        );
        self.sink.notify(&AuctionEvent::AuctionCreated {
            auction: id,
            asset,
            seller,
            min_bid,
            end_time,
        });
        Ok(id)
    }

    /// Place a bid. The offer must strictly exceed the current bid and
    /// arrive before `end_time`.
    ///
    /// A displacing bid refunds the prior bidder exactly the prior
    /// `current_bid` before the new deposit is recorded; a bidder raising
    /// their own position supplies only the increment.
    ///
    /// # Errors
    /// - `AuctionNotFound` if the auction does not exist
    /// - `BidTooLow` if `amount <= current_bid`
    /// - `Expired` if `now >= end_time`
    /// - `InsufficientFunds` if the bidder cannot cover the deposit
    ///   (auction and escrow unchanged)
    pub fn place_bid(&self, auction: AuctionId, amount: Amount, bidder: AccountId) -> Result<()> {
        let entry = self.auction_entry(auction)?;
        let mut state = lock_state(&entry);

        if amount <= state.current_bid {
            return Err(OpenbidError::BidTooLow {
                offered: amount,
                current: state.current_bid,
            });
        }
        let now = self.clock.now();
        if state.ended || state.is_expired(now) {
            return Err(OpenbidError::Expired {
                now,
                end_time: state.end_time,
            });
        }

        let refunded = if !state.has_real_bid() || state.highest_bidder == bidder {
            self.escrow
                .deposit_delta(state.escrow, amount, bidder, self.wallet.as_ref())?;
            None
        } else {
            let prior = state.highest_bidder;
            let returned = self.escrow.displace(
                state.escrow,
                prior,
                bidder,
                amount,
                self.wallet.as_ref(),
            )?;
            Some((prior, returned))
        };

        state.current_bid = amount;
        state.highest_bidder = bidder;

        tracing::debug!(
            auction = %auction,
            bidder = %bidder,
            amount = %amount,
            refunded = ?refunded,
            "Bid placed"
        );
        self.sink.notify(&AuctionEvent::BidPlaced {
            auction,
            bidder,
            amount,
            refunded,
        });
        Ok(())
    }

    /// Close an auction at or after its deadline. Closure is not
    /// replayable: the `ended` flag is a strict precondition gate.
    ///
    /// With no real bid, the asset goes straight back to the seller and
    /// the slot is cleared. With a real bid, the winning payment settles
    /// to the seller and the asset stays in custody pending the winner's
    /// explicit claim.
    ///
    /// # Errors
    /// - `AuctionNotFound` if the auction does not exist
    /// - `AlreadyEnded` if closure already ran
    /// - `NotYetExpired` if `now < end_time` (all fields unchanged)
    pub fn end_auction(&self, auction: AuctionId) -> Result<()> {
        let entry = self.auction_entry(auction)?;
        let mut state = lock_state(&entry);

        if state.ended {
            return Err(OpenbidError::AlreadyEnded(auction));
        }
        let now = self.clock.now();
        if !state.is_expired(now) {
            return Err(OpenbidError::NotYetExpired {
                now,
                end_time: state.end_time,
            });
        }

        if state.has_real_bid() {
            let winner = state.highest_bidder;
            let price = state.current_bid;
            self.escrow
                .take(state.escrow, price, state.seller, self.wallet.as_ref())?;
            state.ended = true;

            tracing::info!(
                auction = %auction,
                winner = %winner,
                price = %price,
                "Auction ended, settled"
            );
            self.sink.notify(&AuctionEvent::AuctionEnded {
                auction,
                outcome: AuctionOutcome::Settled { winner, price },
            });
        } else {
            let asset = state.asset.ok_or_else(|| {
                OpenbidError::Internal("held-asset slot empty before closure".into())
            })?;
            self.registry
                .release_from_auction(asset, state.id, state.seller)?;
            state.asset = None;
            state.ended = true;

            tracing::info!(auction = %auction, asset = %asset, "Auction ended, no bids");
            self.sink.notify(&AuctionEvent::AuctionEnded {
                auction,
                outcome: AuctionOutcome::NoBids,
            });
        }
        Ok(())
    }

    /// Release the held asset to the auction winner. The only path that
    /// clears the slot in the settled-with-bids branch.
    ///
    /// # Errors
    /// - `AuctionNotFound` if the auction does not exist
    /// - `NotYetEnded` if closure has not run
    /// - `Unauthorized` if `caller` is not the recorded winner
    /// - `AlreadyClaimed` if the slot was already cleared
    pub fn claim_asset(&self, auction: AuctionId, caller: AccountId) -> Result<()> {
        let entry = self.auction_entry(auction)?;
        let mut state = lock_state(&entry);

        if !state.ended {
            return Err(OpenbidError::NotYetEnded(auction));
        }
        if caller != state.highest_bidder {
            return Err(OpenbidError::Unauthorized {
                reason: format!("{caller} is not the winner of {auction}"),
            });
        }
        let Some(asset) = state.asset else {
            return Err(OpenbidError::AlreadyClaimed(auction));
        };

        self.registry.release_from_auction(asset, state.id, caller)?;
        state.asset = None;

        tracing::info!(auction = %auction, asset = %asset, winner = %caller, "Asset claimed");
        self.sink.notify(&AuctionEvent::AssetClaimed {
            auction,
            asset,
            winner: caller,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------

    pub fn current_bid(&self, auction: AuctionId) -> Result<Amount> {
        Ok(lock_state(&self.auction_entry(auction)?).current_bid)
    }

    pub fn highest_bidder(&self, auction: AuctionId) -> Result<AccountId> {
        Ok(lock_state(&self.auction_entry(auction)?).highest_bidder)
    }

    pub fn has_ended(&self, auction: AuctionId) -> Result<bool> {
        Ok(lock_state(&self.auction_entry(auction)?).ended)
    }

    /// The balance currently escrowed for an auction.
    pub fn escrowed_balance(&self, auction: AuctionId) -> Result<Amount> {
        let handle = lock_state(&self.auction_entry(auction)?).escrow;
        self.escrow.balance(handle)
    }

    /// Check escrow conservation for one auction.
    ///
    /// # Errors
    /// Returns `ConservationViolation` if value was created or destroyed.
    pub fn verify_escrow(&self, auction: AuctionId) -> Result<()> {
        let handle = lock_state(&self.auction_entry(auction)?).escrow;
        self.escrow.verify(handle)
    }

    #[must_use]
    pub fn auction_count(&self) -> usize {
        self.read_auctions().len()
    }

    fn auction_entry(&self, id: AuctionId) -> Result<Arc<Mutex<Auction>>> {
        self.read_auctions()
            .get(&id)
            .cloned()
            .ok_or(OpenbidError::AuctionNotFound(id))
    }

    fn read_auctions(&self) -> RwLockReadGuard<'_, HashMap<AuctionId, Arc<Mutex<Auction>>>> {
        self.auctions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_auctions(&self) -> RwLockWriteGuard<'_, HashMap<AuctionId, Arc<Mutex<Auction>>>> {
        self.auctions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_state(entry: &Arc<Mutex<Auction>>) -> MutexGuard<'_, Auction> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
