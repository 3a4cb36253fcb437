//! The asset table and custody transfer.
//!
//! All mutations are atomic: either the full operation succeeds or the
//! table is unchanged. Notifications are emitted after the table lock is
//! released, with every identity captured before custody moved.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use openbid_types::{
    AccountId, Asset, AssetId, AuctionEvent, AuctionId, EventSink, Holder, OpenbidError, Result,
};

/// The source of truth for asset records and custody.
///
/// Safe for concurrent use: each operation touches a single asset under
/// the table lock. The registry exclusively owns asset records outside of
/// auction custody; the hand-off pair below is how an auction borrows one.
pub struct AssetRegistry {
    assets: RwLock<HashMap<AssetId, Asset>>,
    sink: Arc<dyn EventSink>,
}

impl AssetRegistry {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            assets: RwLock::new(HashMap::new()),
            sink,
        }
    }

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
        for (field, value) in [
            ("name", name),
            ("description", description),
            ("image_ref", image_ref),
        ] {
            if value.is_empty() {
                return Err(OpenbidError::InvalidInput {
                    reason: format!("asset {field} must not be empty"),
                });
            }
        }

        let id = AssetId::new();
        let asset = Asset {
            id,
            name: name.to_string(),
            description: description.to_string(),
            image_ref: image_ref.to_string(),
            holder: Holder::Account(creator),
        };
        self.write_table().insert(id, asset);

        tracing::info!(asset = %id, owner = %creator, name, "Asset minted");
        self.sink.notify(&AuctionEvent::AssetMinted {
            asset: id,
            owner: creator,
            name: name.to_string(),
        });
        Ok(id)
    }

    /// Move custody from `caller` to `recipient`.
    ///
    /// # Errors
    /// - `AssetNotFound` if the asset does not exist
    /// - `Unauthorized` if `caller` is not the current account holder
    pub fn transfer(&self, asset: AssetId, recipient: AccountId, caller: AccountId) -> Result<()> {
        {
            let mut table = self.write_table();
            let record = table
                .get_mut(&asset)
                .ok_or(OpenbidError::AssetNotFound(asset))?;
            let holder = record.holder.account();
            if holder != Some(caller) {
                return Err(OpenbidError::Unauthorized {
                    reason: format!("{caller} is not the custodian of {asset}"),
                });
            }
            record.holder = Holder::Account(recipient);
        }

        tracing::debug!(asset = %asset, from = %caller, to = %recipient, "Asset transferred");
        self.sink.notify(&AuctionEvent::AssetTransferred {
            asset,
            from: caller,
            to: recipient,
        });
        Ok(())
    }

    /// Permanently destroy an asset.
    ///
    /// # Errors
    /// - `AssetNotFound` if the asset does not exist
    /// - `AssetInUse` if the asset is held by an auction
    /// - `Unauthorized` if `caller` is not the current account holder
    pub fn burn(&self, asset: AssetId, caller: AccountId) -> Result<()> {
        {
            let mut table = self.write_table();
            let record = table
                .get(&asset)
                .ok_or(OpenbidError::AssetNotFound(asset))?;
            match record.holder {
                Holder::Auction(auction) => {
                    return Err(OpenbidError::AssetInUse { asset, auction });
                }
                Holder::Account(owner) if owner != caller => {
                    return Err(OpenbidError::Unauthorized {
                        reason: format!("{caller} is not the custodian of {asset}"),
                    });
                }
                Holder::Account(_) => {}
            }
            table.remove(&asset);
        }

        tracing::info!(asset = %asset, owner = %caller, "Asset burned");
        self.sink.notify(&AuctionEvent::AssetBurned {
            asset,
            owner: caller,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Auction custody hand-off
    // -----------------------------------------------------------------

    /// Move the asset from `seller`'s custody into `auction`'s custody.
    ///
    /// The custody model enforces exclusivity: an asset already held by an
    /// auction cannot enter another one.
    ///
    /// # Errors
    /// - `AssetNotFound` if the asset does not exist
    /// - `AssetInUse` if the asset is already held by an auction
    /// - `Unauthorized` if `seller` is not the current account holder
    pub fn hold_for_auction(
        &self,
        asset: AssetId,
        auction: AuctionId,
        seller: AccountId,
    ) -> Result<()> {
        let mut table = self.write_table();
        let record = table
            .get_mut(&asset)
            .ok_or(OpenbidError::AssetNotFound(asset))?;
        match record.holder {
            Holder::Auction(holding) => Err(OpenbidError::AssetInUse {
                asset,
                auction: holding,
            }),
            Holder::Account(owner) if owner != seller => Err(OpenbidError::Unauthorized {
                reason: format!("{seller} is not the custodian of {asset}"),
            }),
            Holder::Account(_) => {
                record.holder = Holder::Auction(auction);
                Ok(())
            }
        }
    }

    /// Release the asset out of `auction`'s custody to `recipient`.
    ///
    /// # Errors
    /// - `AssetNotFound` if the asset does not exist
    /// - `Unauthorized` if the asset is not held by `auction`
    pub fn release_from_auction(
        &self,
        asset: AssetId,
        auction: AuctionId,
        recipient: AccountId,
    ) -> Result<()> {
        let mut table = self.write_table();
        let record = table
            .get_mut(&asset)
            .ok_or(OpenbidError::AssetNotFound(asset))?;
        if record.holder != Holder::Auction(auction) {
            return Err(OpenbidError::Unauthorized {
                reason: format!("{asset} is not held by {auction}"),
            });
        }
        record.holder = Holder::Account(recipient);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------

    pub fn name(&self, asset: AssetId) -> Result<String> {
        self.with_asset(asset, |a| a.name.clone())
    }

    pub fn description(&self, asset: AssetId) -> Result<String> {
        self.with_asset(asset, |a| a.description.clone())
    }

    pub fn image_ref(&self, asset: AssetId) -> Result<String> {
        self.with_asset(asset, |a| a.image_ref.clone())
    }

    pub fn holder(&self, asset: AssetId) -> Result<Holder> {
        self.with_asset(asset, |a| a.holder)
    }

    #[must_use]
    pub fn contains(&self, asset: AssetId) -> bool {
        self.read_table().contains_key(&asset)
    }

    /// Number of live (unburned) assets.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.read_table().len()
    }

    fn with_asset<T>(&self, asset: AssetId, f: impl FnOnce(&Asset) -> T) -> Result<T> {
        let table = self.read_table();
        let record = table.get(&asset).ok_or(OpenbidError::AssetNotFound(asset))?;
        Ok(f(record))
    }

    fn read_table(&self) -> RwLockReadGuard<'_, HashMap<AssetId, Asset>> {
        self.assets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, HashMap<AssetId, Asset>> {
        self.assets.write().unwrap_or_else(PoisonError::into_inner)
    }
}
