// Copyright (c) 2026 SafePay Team. MIT License.
// See LICENSE for details.

//! # SafePay Ledger — Accounts & Settlement Substrate
//!
//! The ledger is where money lives in SafePay. Every escrow deposit, every
//! payout, every refund is a balance movement recorded here. The escrow
//! contract decides *whether* value may move; this crate is the only place
//! that actually moves it.
//!
//! ## Architecture
//!
//! ```text
//! address.rs — account identifiers: Ed25519-derived addresses and
//!              per-escrow vault accounts
//! ledger.rs  — balance bookkeeping: mint, transfer, and the all-or-nothing
//!              multi-leg disburse used at settlement
//! ```
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` in smallest-unit denomination.** No floating
//!    point, no decimals in arithmetic. Display conversion is somebody
//!    else's problem.
//! 2. **Every arithmetic operation is checked.** `checked_add` and
//!    `checked_sub` everywhere — wrapping arithmetic and money do not mix.
//! 3. **Settlement is all-or-nothing.** A multi-leg disbursement either
//!    lands every leg or leaves the ledger byte-for-byte unchanged. Partial
//!    payouts are not representable.
//! 4. **Serializable state.** Every struct derives `Serialize` and
//!    `Deserialize` so ledger state can be persisted or snapshotted.

pub mod address;
pub mod ledger;

pub use address::{Address, AddressError};
pub use ledger::{Ledger, LedgerError};
