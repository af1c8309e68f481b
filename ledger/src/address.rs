//! # Account Addresses
//!
//! An [`Address`] identifies a party that can hold a balance on the ledger.
//! Two kinds of account exist:
//!
//! - **Key accounts** — hex-encoded Ed25519 public keys. These belong to
//!   people (buyer, seller, developer) and are what callers present when
//!   invoking escrow operations.
//! - **Vault accounts** — derived from an escrow instance id. These belong
//!   to a contract instance, hold the locked deposit while the instance is
//!   `Active`, and are emptied exactly once at settlement.
//!
//! The two namespaces cannot collide: key accounts are raw hex, vault
//! accounts carry a `vault:` prefix.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Prefix that separates vault accounts from key accounts.
const VAULT_PREFIX: &str = "vault:";

/// Errors that can occur when parsing an address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The string is not valid hex.
    #[error("address is not valid hex: {0}")]
    InvalidHex(String),

    /// The decoded key has the wrong length for an Ed25519 public key.
    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected number of bytes (always 32).
        expected: usize,
        /// Actual number of decoded bytes.
        got: usize,
    },
}

/// An account identifier on the SafePay ledger.
///
/// Cheap to clone, ordered (so ledger state serializes deterministically),
/// and opaque — nothing outside this module should care which namespace an
/// address lives in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Builds a key account address from an Ed25519 verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Address(hex::encode(key.as_bytes()))
    }

    /// Parses a key account address from its hex form.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidHex`] if the string is not hex, or
    /// [`AddressError::InvalidLength`] if it does not decode to 32 bytes.
    pub fn from_public_key_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AddressError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }
        Ok(Address(s.to_lowercase()))
    }

    /// Derives the vault account for an escrow instance.
    ///
    /// Deterministic: the same instance id always maps to the same vault,
    /// and distinct instances never share one.
    pub fn vault(escrow_id: &Uuid) -> Self {
        Address(format!("{VAULT_PREFIX}{escrow_id}"))
    }

    /// Returns `true` if this is a contract-owned vault account.
    pub fn is_vault(&self) -> bool {
        self.0.starts_with(VAULT_PREFIX)
    }

    /// The raw string form of the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
