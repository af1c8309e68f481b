//! # Escrow Contract
//!
//! A single-use custody contract. The buyer deploys one instance per
//! purchase, attaching the deposit; from that moment exactly two things can
//! ever happen to the money:
//!
//! 1. **Release** — the buyer confirms delivery; the deposit is split
//!    between the seller and the platform developer.
//! 2. **Refund** — the seller returns the deposit voluntarily, or anyone
//!    triggers the return after the refund deadline has elapsed.
//!
//! Each instance settles at most once. The canonical [`EscrowStatus`] is a
//! single enum — `is_completed()`/`is_refunded()` are projections of it,
//! never independently stored flags, so contradictory states are
//! unrepresentable.
//!
//! ## Settlement ordering
//!
//! The terminal status is written *before* any outbound transfer. A
//! recipient that re-enters `release_funds`/`refund` mid-payout observes a
//! non-`Active` status and is rejected at the `AlreadySettled` check. If the
//! payout itself fails, the whole settlement is undone: the status write is
//! reverted and the ledger guarantees no leg landed, so the instance stays
//! open for retry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use safepay_ledger::{Address, Ledger, LedgerError};

use crate::config::REFUND_TIMEOUT_SECS;
use crate::fees::FeeSchedule;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during escrow operations.
///
/// Every error aborts the triggering call atomically: no status change, no
/// balance movement. Retrying after an error is always safe.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// The caller lacks authority for the requested transition.
    #[error("access denied: {caller} may not call {operation}")]
    AccessDenied {
        /// The address that attempted the operation.
        caller: Address,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// The instance is in a terminal state; no further transitions exist.
    #[error("already settled: escrow is {status}")]
    AlreadySettled {
        /// The terminal status the instance is in.
        status: EscrowStatus,
    },

    /// A non-seller attempted a refund before the deadline opened the
    /// permissionless path.
    #[error("refund deadline not reached: anyone may refund after {deadline}")]
    DeadlineNotReached {
        /// When the permissionless refund path opens.
        deadline: DateTime<Utc>,
    },

    /// A payout leg could not be delivered. The settlement was rolled back
    /// in full; the instance is still `Active`.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    /// Deployment requires a positive deposit.
    #[error("invalid deposit: escrow must lock a positive amount")]
    InvalidDeposit,
}

// ---------------------------------------------------------------------------
// Status & events
// ---------------------------------------------------------------------------

/// The canonical lifecycle state of an escrow instance.
///
/// Strictly one-directional: `Active -> Completed` or `Active -> Refunded`,
/// at most once. Nothing leaves or re-enters a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Deposit locked, awaiting release or refund.
    Active,
    /// Funds released to seller and developer. Terminal.
    Completed,
    /// Deposit returned to the buyer. Terminal.
    Refunded,
}

impl EscrowStatus {
    /// Returns `true` for `Completed` and `Refunded`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EscrowStatus::Active)
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscrowStatus::Active => write!(f, "Active"),
            EscrowStatus::Completed => write!(f, "Completed"),
            EscrowStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

/// Settlement record emitted on a successful write operation, for off-chain
/// observers (history display, notifications).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowEvent {
    /// The buyer released the deposit.
    Released {
        /// Release beneficiary.
        seller: Address,
        /// The seller's share after the platform fee.
        seller_payout: u64,
        /// The platform developer's share.
        developer_fee: u64,
    },
    /// The deposit was returned in full.
    Refunded {
        /// The original funder.
        buyer: Address,
        /// The full locked amount.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// Escrow
// ---------------------------------------------------------------------------

/// One deployed escrow instance.
///
/// The parties, the locked amount, and the fee schedule are fixed at
/// creation; only `status` ever changes, and it changes at most once. After
/// settlement the instance persists as an immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escrow {
    /// Unique identifier; the vault account is derived from it.
    pub escrow_id: Uuid,
    /// Deployer and funder. Exclusive authority to release.
    pub buyer: Address,
    /// Designated at creation. Voluntary-refund authority and sole release
    /// beneficiary.
    pub seller: Address,
    /// Platform fee recipient, fixed at creation.
    pub developer: Address,
    /// The deposit locked at creation. Immutable.
    pub locked_amount: u64,
    /// Fee policy baked in at creation.
    pub fee: FeeSchedule,
    /// Canonical lifecycle state. The only mutable field.
    pub status: EscrowStatus,
    /// Creation time; the refund deadline is derived from it.
    pub created_at: DateTime<Utc>,
}

impl Escrow {
    /// Deploys a new instance, moving `deposit` from the buyer's account
    /// into the instance vault.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidDeposit`] for a zero deposit, or
    /// [`EscrowError::TransferFailed`] if the buyer cannot cover it. On
    /// error no instance exists and no funds have moved.
    pub fn create(
        ledger: &mut Ledger,
        buyer: Address,
        seller: Address,
        developer: Address,
        deposit: u64,
    ) -> Result<Self, EscrowError> {
        if deposit == 0 {
            return Err(EscrowError::InvalidDeposit);
        }

        let escrow_id = Uuid::new_v4();
        let vault = Address::vault(&escrow_id);
        ledger.transfer(&buyer, &vault, deposit)?;

        Ok(Self {
            escrow_id,
            buyer,
            seller,
            developer,
            locked_amount: deposit,
            fee: FeeSchedule::default(),
            status: EscrowStatus::Active,
            created_at: Utc::now(),
        })
    }

    // -- views ----------------------------------------------------------------

    /// The contract-owned account holding the deposit while `Active`.
    pub fn vault(&self) -> Address {
        Address::vault(&self.escrow_id)
    }

    /// Derived from `status`; never independently stored.
    pub fn is_completed(&self) -> bool {
        self.status == EscrowStatus::Completed
    }

    /// Derived from `status`; never independently stored.
    pub fn is_refunded(&self) -> bool {
        self.status == EscrowStatus::Refunded
    }

    /// When the refund path stops being seller-only and opens to anyone.
    /// Purely derived: `created_at + REFUND_TIMEOUT_SECS`.
    pub fn refund_deadline(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(REFUND_TIMEOUT_SECS)
    }

    /// Whether the refund deadline has elapsed. Read-only.
    pub fn deadline_elapsed(&self) -> bool {
        Utc::now() >= self.refund_deadline()
    }

    // -- access control gate ----------------------------------------------------

    /// Rejects any call against a settled instance.
    fn require_active(&self) -> Result<(), EscrowError> {
        if self.status.is_terminal() {
            return Err(EscrowError::AlreadySettled {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Release is buyer-only, phase `Active`.
    fn authorize_release(&self, caller: &Address) -> Result<(), EscrowError> {
        self.require_active()?;
        if *caller != self.buyer {
            return Err(EscrowError::AccessDenied {
                caller: caller.clone(),
                operation: "release_funds",
            });
        }
        Ok(())
    }

    /// Refund is a two-clause predicate: seller at any time, or anyone once
    /// the deadline has elapsed. The timeout clause is deliberately
    /// unprivileged — it exists to protect the buyer from an unresponsive
    /// seller.
    fn authorize_refund(&self, caller: &Address) -> Result<(), EscrowError> {
        self.require_active()?;
        if *caller == self.seller || self.deadline_elapsed() {
            return Ok(());
        }
        Err(EscrowError::DeadlineNotReached {
            deadline: self.refund_deadline(),
        })
    }

    // -- transitions -----------------------------------------------------------

    /// `Active -> Completed`: pays the seller and the platform developer
    /// from the locked deposit.
    ///
    /// The two payout legs always sum to exactly `locked_amount` (remainder
    /// to the seller), and they land atomically or not at all.
    ///
    /// # Errors
    ///
    /// [`EscrowError::AccessDenied`] if the caller is not the buyer,
    /// [`EscrowError::AlreadySettled`] if the instance is terminal,
    /// [`EscrowError::TransferFailed`] if a payout leg cannot be delivered —
    /// in which case the instance remains `Active` with its full balance.
    pub fn release_funds(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
    ) -> Result<EscrowEvent, EscrowError> {
        self.authorize_release(caller)?;

        let split = self.fee.split(self.locked_amount);
        let legs = [
            (self.seller.clone(), split.seller_payout),
            (self.developer.clone(), split.developer_fee),
        ];

        // Terminal status first, transfers second: a re-entering recipient
        // sees Completed and is stopped at require_active().
        self.status = EscrowStatus::Completed;
        if let Err(err) = ledger.disburse(&self.vault(), &legs) {
            // The ledger guarantees no leg landed; undo the status write so
            // the whole settlement is as if it never happened.
            self.status = EscrowStatus::Active;
            return Err(err.into());
        }

        Ok(EscrowEvent::Released {
            seller: self.seller.clone(),
            seller_payout: split.seller_payout,
            developer_fee: split.developer_fee,
        })
    }

    /// `Active -> Refunded`: returns the full deposit to the buyer.
    ///
    /// No fee is taken on the refund path.
    ///
    /// # Errors
    ///
    /// [`EscrowError::DeadlineNotReached`] if a non-seller calls before the
    /// deadline, [`EscrowError::AlreadySettled`] if the instance is
    /// terminal, [`EscrowError::TransferFailed`] if the buyer cannot receive
    /// — in which case the instance remains `Active` with its full balance.
    pub fn refund(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
    ) -> Result<EscrowEvent, EscrowError> {
        self.authorize_refund(caller)?;

        let legs = [(self.buyer.clone(), self.locked_amount)];

        self.status = EscrowStatus::Refunded;
        if let Err(err) = ledger.disburse(&self.vault(), &legs) {
            self.status = EscrowStatus::Active;
            return Err(err.into());
        }

        Ok(EscrowEvent::Refunded {
            buyer: self.buyer.clone(),
            amount: self.locked_amount,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
