//! Asset records and the custody model.
//!
//! An asset is a unique, non-fungible item with immutable descriptive
//! attributes. Custody is a single exclusive slot: at every observable
//! point exactly one [`Holder`] owns the asset, either an account or an
//! auction that has taken temporary custody. Custody transfer is a
//! hand-off, never shared ownership.

use serde::{Deserialize, Serialize};

use crate::{AccountId, AssetId, AuctionId};

/// The exclusive custody slot of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    /// Held directly by an account.
    Account(AccountId),
    /// Held in custody by an in-progress auction.
    Auction(AuctionId),
}

impl Holder {
    /// The holding account, if the asset is not in auction custody.
    #[must_use]
    pub fn account(&self) -> Option<AccountId> {
        match self {
            Self::Account(account) => Some(*account),
            Self::Auction(_) => None,
        }
    }

    #[must_use]
    pub fn is_auction(&self) -> bool {
        matches!(self, Self::Auction(_))
    }
}

impl std::fmt::Display for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(account) => write!(f, "account:{account}"),
            Self::Auction(auction) => write!(f, "{auction}"),
        }
    }
}

/// A registered asset. Descriptive fields are immutable after mint;
/// only the custody slot changes over the asset's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub description: String,
    pub image_ref: String,
    pub holder: Holder,
}

impl Asset {
    #[must_use]
    pub fn is_in_auction(&self) -> bool {
        self.holder.is_auction()
    }
}
