// Copyright (c) 2026 SafePay Team. MIT License.
// See LICENSE for details.

//! # SafePay Escrow Contracts
//!
//! The trust kernel of SafePay: a fund-custody contract that holds a
//! buyer's deposit and releases or refunds it under strict, auditable
//! conditions. Everything else — UIs, wallets, deployment tooling — is a
//! thin client over the surface defined here.
//!
//! - **escrow** — the contract itself: access gate, state transition
//!   engine, and settlement against the custody ledger.
//! - **fees** — deterministic basis-point split of a release payout.
//! - **config** — the platform constants (fee rate, refund timeout).
//!
//! ## Design Principles
//!
//! 1. Money moves exactly once, to exactly one of two parties. The status
//!    check-and-set and the value transfer form one indivisible unit: a
//!    failed payout rolls the whole settlement back.
//! 2. State is an enum, not boolean flags. `is_completed`/`is_refunded`
//!    are projections of one canonical status, so they can never both be
//!    true.
//! 3. Terminal status is written before any outbound transfer; re-entrant
//!    calls die at the `AlreadySettled` check.
//! 4. Every public type is serializable (serde) for persistence and wire
//!    transport.

pub mod config;
pub mod escrow;
pub mod fees;

pub use escrow::{Escrow, EscrowError, EscrowEvent, EscrowStatus};
pub use fees::{FeeSchedule, FeeSplit};
