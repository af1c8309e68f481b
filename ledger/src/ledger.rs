//! # Balance Bookkeeping
//!
//! A [`Ledger`] maps [`Address`] to a `u64` balance and enforces the two
//! rules that matter when the numbers are money: you cannot spend what you
//! do not have, and a settlement either lands completely or not at all.
//!
//! Accounts can be **frozen**: a frozen account refuses incoming credits
//! (think of a recipient that cannot accept funds). Freezing never blocks
//! outgoing debits — funds already held can always leave.
//!
//! The interesting operation is [`Ledger::disburse`]: the multi-leg payout
//! used by the escrow engine at settlement. Every leg is validated before
//! any balance is touched, so a failing leg leaves the ledger exactly as it
//! was. Callers never observe a half-paid settlement.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Attempted to debit more than the available balance.
    #[error("insufficient balance: account {account} holds {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// The current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Arithmetic overflow during a credit.
    ///
    /// Hitting this means someone tried to credit past `u64::MAX`. That is
    /// either a bug or an attack; refuse both.
    #[error("balance overflow: account {account} holds {current}, credit {credit}")]
    Overflow {
        /// The account being credited.
        account: Address,
        /// The balance before the failed credit.
        current: u64,
        /// The credit amount that caused the overflow.
        credit: u64,
    },

    /// The recipient account is frozen and cannot receive funds.
    #[error("account {0} is frozen and cannot receive funds")]
    AccountFrozen(Address),

    /// Attempted to debit an account the ledger has never seen.
    #[error("unknown account: {0}")]
    UnknownAccount(Address),
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The complete balance state for one SafePay deployment.
///
/// `BTreeMap`/`BTreeSet` rather than hash collections so that serialized
/// state is deterministic — the same ledger always produces the same JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Balances indexed by account address.
    balances: BTreeMap<Address, u64>,

    /// Accounts that currently refuse incoming credits.
    frozen: BTreeSet<Address>,

    /// Timestamp of the last balance-modifying operation.
    last_updated: DateTime<Utc>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
            frozen: BTreeSet::new(),
            last_updated: Utc::now(),
        }
    }

    /// Returns the balance of an account. Unknown accounts hold zero.
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns `true` if the account currently refuses incoming credits.
    pub fn is_frozen(&self, account: &Address) -> bool {
        self.frozen.contains(account)
    }

    /// Marks an account as unable to receive funds.
    pub fn freeze(&mut self, account: Address) {
        self.frozen.insert(account);
    }

    /// Lifts a freeze. No-op if the account was not frozen.
    pub fn unfreeze(&mut self, account: &Address) {
        self.frozen.remove(account);
    }

    /// Credits an account out of thin air.
    ///
    /// This is the devnet faucet — there is no real issuance model here.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountFrozen`] if the account refuses credits,
    /// or [`LedgerError::Overflow`] if the credit would exceed `u64::MAX`.
    pub fn mint(&mut self, to: &Address, amount: u64) -> Result<u64, LedgerError> {
        self.check_credit(to, amount)?;
        Ok(self.apply_credit(to, amount))
    }

    /// Moves `amount` from one account to another.
    ///
    /// Validates both legs before touching either balance, so a failed
    /// transfer leaves the ledger unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAccount`] or
    /// [`LedgerError::InsufficientBalance`] for the debit side, and
    /// [`LedgerError::AccountFrozen`] or [`LedgerError::Overflow`] for the
    /// credit side.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        self.check_debit(from, amount)?;
        self.check_credit(to, amount)?;

        self.apply_debit(from, amount);
        self.apply_credit(to, amount);
        Ok(())
    }

    /// Pays out `legs` from `from` as a single indivisible settlement.
    ///
    /// All-or-nothing: every leg is validated (source covers the total, no
    /// recipient is frozen, no credit overflows) before any balance is
    /// mutated. If validation fails, the ledger is byte-for-byte unchanged
    /// and the error identifies the offending leg.
    ///
    /// Paying an account twice in one disbursement is allowed; the legs
    /// accumulate.
    pub fn disburse(&mut self, from: &Address, legs: &[(Address, u64)]) -> Result<(), LedgerError> {
        let mut total: u64 = 0;
        for (_, amount) in legs {
            total = total.checked_add(*amount).ok_or(LedgerError::Overflow {
                account: from.clone(),
                current: total,
                credit: *amount,
            })?;
        }
        self.check_debit(from, total)?;

        // Validate every credit leg against the balances as they will be
        // after earlier legs have landed, so duplicate recipients are
        // checked correctly.
        let mut projected: BTreeMap<&Address, u64> = BTreeMap::new();
        for (to, amount) in legs {
            if self.is_frozen(to) {
                return Err(LedgerError::AccountFrozen(to.clone()));
            }
            let current = projected
                .get(to)
                .copied()
                .unwrap_or_else(|| self.balance_of(to));
            let next = current.checked_add(*amount).ok_or(LedgerError::Overflow {
                account: to.clone(),
                current,
                credit: *amount,
            })?;
            projected.insert(to, next);
        }

        // Point of no return: all legs validated, apply them.
        self.apply_debit(from, total);
        for (to, amount) in legs {
            self.apply_credit(to, *amount);
        }
        Ok(())
    }

    /// Sum of all balances. Useful as a conservation check in tests.
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }

    // -- internal ------------------------------------------------------------

    fn check_debit(&self, from: &Address, amount: u64) -> Result<(), LedgerError> {
        let available = *self
            .balances
            .get(from)
            .ok_or_else(|| LedgerError::UnknownAccount(from.clone()))?;
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.clone(),
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    fn check_credit(&self, to: &Address, amount: u64) -> Result<(), LedgerError> {
        if self.is_frozen(to) {
            return Err(LedgerError::AccountFrozen(to.clone()));
        }
        let current = self.balance_of(to);
        current.checked_add(amount).ok_or(LedgerError::Overflow {
            account: to.clone(),
            current,
            credit: amount,
        })?;
        Ok(())
    }

    /// Caller must have validated via [`Self::check_debit`] first.
    fn apply_debit(&mut self, from: &Address, amount: u64) {
        if let Some(balance) = self.balances.get_mut(from) {
            *balance -= amount;
        }
        self.last_updated = Utc::now();
    }

    /// Caller must have validated via [`Self::check_credit`] first.
    fn apply_credit(&mut self, to: &Address, amount: u64) -> u64 {
        let balance = self.balances.entry(to.clone()).or_insert(0);
        *balance += amount;
        self.last_updated = Utc::now();
        *balance
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn addr(tag: &str) -> Address {
        // 32 pseudo-bytes derived from the tag; enough for ledger tests.
        Address::from_public_key_hex(&format!("{:0>64}", hex::encode(tag))).unwrap()
    }

    #[test]
    fn mint_creates_account() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");

        assert_eq!(ledger.mint(&alice, 1000).unwrap(), 1000);
        assert_eq!(ledger.balance_of(&alice), 1000);
    }

    #[test]
    fn balance_of_unknown_account_is_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance_of(&addr("ghost")), 0);
    }

    #[test]
    fn transfer_moves_funds() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");
        let bob = addr("bob");

        ledger.mint(&alice, 1000).unwrap();
        ledger.transfer(&alice, &bob, 400).unwrap();

        assert_eq!(ledger.balance_of(&alice), 600);
        assert_eq!(ledger.balance_of(&bob), 400);
    }

    #[test]
    fn transfer_insufficient_balance_rejected() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");
        let bob = addr("bob");

        ledger.mint(&alice, 100).unwrap();
        let result = ledger.transfer(&alice, &bob, 200);

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                available: 100,
                requested: 200,
                ..
            })
        ));
        // Nothing moved.
        assert_eq!(ledger.balance_of(&alice), 100);
        assert_eq!(ledger.balance_of(&bob), 0);
    }

    #[test]
    fn transfer_from_unknown_account_rejected() {
        let mut ledger = Ledger::new();
        let result = ledger.transfer(&addr("ghost"), &addr("bob"), 1);
        assert!(matches!(result, Err(LedgerError::UnknownAccount(_))));
    }

    #[test]
    fn frozen_account_refuses_credits_but_can_spend() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");
        let bob = addr("bob");

        ledger.mint(&bob, 500).unwrap();
        ledger.freeze(bob.clone());

        let result = ledger.mint(&bob, 1);
        assert!(matches!(result, Err(LedgerError::AccountFrozen(_))));

        // Outgoing debits still work.
        ledger.transfer(&bob, &alice, 500).unwrap();
        assert_eq!(ledger.balance_of(&alice), 500);

        ledger.unfreeze(&bob);
        ledger.mint(&bob, 1).unwrap();
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");

        ledger.mint(&alice, u64::MAX).unwrap();
        let result = ledger.mint(&alice, 1);
        assert!(matches!(result, Err(LedgerError::Overflow { .. })));
    }

    #[test]
    fn disburse_pays_every_leg() {
        let mut ledger = Ledger::new();
        let vault = Address::vault(&Uuid::new_v4());
        let seller = addr("seller");
        let dev = addr("dev");

        ledger.mint(&vault, 1000).unwrap();
        ledger
            .disburse(&vault, &[(seller.clone(), 970), (dev.clone(), 30)])
            .unwrap();

        assert_eq!(ledger.balance_of(&vault), 0);
        assert_eq!(ledger.balance_of(&seller), 970);
        assert_eq!(ledger.balance_of(&dev), 30);
    }

    #[test]
    fn disburse_frozen_leg_rolls_back_everything() {
        let mut ledger = Ledger::new();
        let vault = Address::vault(&Uuid::new_v4());
        let seller = addr("seller");
        let dev = addr("dev");

        ledger.mint(&vault, 1000).unwrap();
        ledger.freeze(dev.clone());

        let result = ledger.disburse(&vault, &[(seller.clone(), 970), (dev.clone(), 30)]);
        assert!(matches!(result, Err(LedgerError::AccountFrozen(_))));

        // The seller leg was valid, but nothing may land.
        assert_eq!(ledger.balance_of(&vault), 1000);
        assert_eq!(ledger.balance_of(&seller), 0);
        assert_eq!(ledger.balance_of(&dev), 0);
    }

    #[test]
    fn disburse_exceeding_source_rejected() {
        let mut ledger = Ledger::new();
        let vault = Address::vault(&Uuid::new_v4());
        let seller = addr("seller");

        ledger.mint(&vault, 100).unwrap();
        let result = ledger.disburse(&vault, &[(seller, 101)]);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.balance_of(&vault), 100);
    }

    #[test]
    fn disburse_duplicate_recipient_accumulates() {
        let mut ledger = Ledger::new();
        let vault = Address::vault(&Uuid::new_v4());
        let seller = addr("seller");

        ledger.mint(&vault, 100).unwrap();
        ledger
            .disburse(&vault, &[(seller.clone(), 60), (seller.clone(), 40)])
            .unwrap();
        assert_eq!(ledger.balance_of(&seller), 100);
    }

    #[test]
    fn disburse_duplicate_recipient_overflow_detected() {
        // Two legs that only overflow in combination must be caught before
        // any balance moves.
        let mut ledger = Ledger::new();
        let vault = Address::vault(&Uuid::new_v4());
        let seller = addr("seller");

        ledger.mint(&seller, u64::MAX - 10).unwrap();
        ledger.mint(&vault, 100).unwrap();

        let result = ledger.disburse(&vault, &[(seller.clone(), 5), (seller.clone(), 6)]);
        assert!(matches!(result, Err(LedgerError::Overflow { .. })));
        assert_eq!(ledger.balance_of(&vault), 100);
        assert_eq!(ledger.balance_of(&seller), u64::MAX - 10);
    }

    #[test]
    fn total_supply_is_conserved_by_transfers() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");
        let bob = addr("bob");

        ledger.mint(&alice, 1000).unwrap();
        let before = ledger.total_supply();
        ledger.transfer(&alice, &bob, 999).unwrap();
        assert_eq!(ledger.total_supply(), before);
    }

    #[test]
    fn ledger_serialization_roundtrip() {
        let mut ledger = Ledger::new();
        let alice = addr("alice");
        ledger.mint(&alice, 42).unwrap();
        ledger.freeze(addr("bob"));

        let json = serde_json::to_string(&ledger).expect("serialize");
        let restored: Ledger = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.balance_of(&alice), 42);
        assert!(restored.is_frozen(&addr("bob")));
    }
}
