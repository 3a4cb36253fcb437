//! # openbid-escrow
//!
//! **Escrow Ledger**: holds monetary value on behalf of an in-progress
//! auction, with strict deposit/withdrawal conservation.
//!
//! ## Architecture
//!
//! 1. **`FundsLedger`**: the seam to the external wallet/account ledger —
//!    the only place value enters or leaves the escrow system
//! 2. **`MemoryWallet`**: bundled in-memory `FundsLedger` for tests and
//!    single-process embedders
//! 3. **`EscrowLedger`**: per-auction value containers with the
//!    deposit-delta / refund / take / displace primitives
//! 4. **Conservation**: per-escrow running totals; at all times
//!    `deposited == released + balance`
//!
//! ## Value flow
//!
//! ```text
//! wallet ──deposit_delta──▶ escrow ──refund──▶ displaced bidder
//!                                  └──take────▶ seller (settlement)
//! ```

pub mod conservation;
pub mod ledger;
pub mod wallet;

pub use conservation::ConservationTotals;
pub use ledger::EscrowLedger;
pub use wallet::{FundsLedger, MemoryWallet};
