//! Append-only event journal with a tamper-evident hash chain.
//!
//! The bundled [`EventSink`] implementation. Each recorded entry gets a
//! sequence number and a SHA-256 chain hash over
//! `(domain_sep || sequence || kind || payload || previous_hash)`, so an
//! observer holding the journal can detect truncation, reordering, or
//! edits anywhere in the history.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AuctionEvent, EventSink};

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0.
    pub sequence: u64,
    pub event: AuctionEvent,
    /// SHA-256 over this entry and the previous entry's hash.
    pub chain_hash: [u8; 32],
}

/// In-memory, append-only event log. Entries are recorded in commit order.
#[derive(Debug, Default)]
pub struct EventJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl EventJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all recorded entries, in commit order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().clone()
    }

    /// The chain hash of the newest entry, hex-encoded.
    pub fn head_hash(&self) -> Option<String> {
        self.lock().last().map(|e| hex::encode(e.chain_hash))
    }

    /// Re-derive every chain hash and compare. `true` iff the journal is
    /// intact end-to-end.
    pub fn verify_chain(&self) -> bool {
        let entries = self.lock();
        let mut prev = [0u8; 32];
        for (i, entry) in entries.iter().enumerate() {
            if entry.sequence != i as u64 {
                return false;
            }
            let expected = Self::hash_entry(entry.sequence, &entry.event, &prev);
            if expected != entry.chain_hash {
                return false;
            }
            prev = entry.chain_hash;
        }
        true
    }

    fn hash_entry(sequence: u64, event: &AuctionEvent, prev: &[u8; 32]) -> [u8; 32] {
        let payload = serde_json::to_vec(event).expect("events serialize to JSON");
        let mut hasher = Sha256::new();
        hasher.update(b"openbid:journal:v1:");
        hasher.update(sequence.to_le_bytes());
        hasher.update(event.kind().as_bytes());
        hasher.update(&payload);
        hasher.update(prev);
        hasher.finalize().into()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<JournalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for EventJournal {
    fn notify(&self, event: &AuctionEvent) {
        let mut entries = self.lock();
        let sequence = entries.len() as u64;
        let prev = entries.last().map_or([0u8; 32], |e| e.chain_hash);
        let chain_hash = Self::hash_entry(sequence, event, &prev);
        entries.push(JournalEntry {
            sequence,
            event: event.clone(),
            chain_hash,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountId, Amount, AssetId};

    fn minted(tag: u8) -> AuctionEvent {
        AuctionEvent::AssetMinted {
            asset: AssetId::new(),
            owner: AccountId::dummy(tag),
            name: format!("Art{tag}"),
        }
    }

    #[test]
    fn records_in_commit_order() {
        let journal = EventJournal::new();
        journal.notify(&minted(1));
        journal.notify(&minted(2));
        journal.notify(&minted(3));

        let entries = journal.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].sequence, 0);
        assert_eq!(entries[2].sequence, 2);
    }

    #[test]
    fn empty_journal_verifies() {
        let journal = EventJournal::new();
        assert!(journal.is_empty());
        assert!(journal.verify_chain());
        assert_eq!(journal.head_hash(), None);
    }

    #[test]
    fn chain_verifies_end_to_end() {
        let journal = EventJournal::new();
        for tag in 0..10 {
            journal.notify(&minted(tag));
        }
        assert!(journal.verify_chain());
        assert!(journal.head_hash().is_some());
    }

    #[test]
    fn tampered_payload_breaks_chain() {
        let journal = EventJournal::new();
        journal.notify(&minted(1));
        journal.notify(&minted(2));

        let mut entries = journal.lock();
        entries[0].event = AuctionEvent::AssetBurned {
            asset: AssetId::new(),
            owner: AccountId::dummy(9),
        };
        drop(entries);

        assert!(!journal.verify_chain());
    }

    #[test]
    fn tampered_order_breaks_chain() {
        let journal = EventJournal::new();
        journal.notify(&minted(1));
        journal.notify(&minted(2));

        let mut entries = journal.lock();
        entries.swap(0, 1);
        drop(entries);

        assert!(!journal.verify_chain());
    }

    #[test]
    fn distinct_events_produce_distinct_hashes() {
        let journal = EventJournal::new();
        journal.notify(&AuctionEvent::BidPlaced {
            auction: crate::AuctionId::new(),
            bidder: AccountId::dummy(1),
            amount: Amount(150),
            refunded: None,
        });
        journal.notify(&AuctionEvent::BidPlaced {
            auction: crate::AuctionId::new(),
            bidder: AccountId::dummy(2),
            amount: Amount(200),
            refunded: Some((AccountId::dummy(1), Amount(150))),
        });
        let entries = journal.entries();
        assert_ne!(entries[0].chain_hash, entries[1].chain_hash);
    }
}
