//! # State File
//!
//! The harness keeps everything — ledger balances, dev account keys, and
//! deployed escrow instances — in one JSON file. This stands in for the
//! chain: each CLI invocation is one serialized transaction (load, mutate,
//! save), which matches the contract's one-call-at-a-time execution model.
//!
//! Dev account secret keys live in the file in the clear. This is a local
//! development harness; do not point it at money you care about.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use safepay_contracts::config::DEV_FAUCET_AMOUNT;
use safepay_contracts::Escrow;
use safepay_ledger::{Address, Ledger};

/// The dev accounts generated by `init`, in creation order.
pub const DEV_ACCOUNT_NAMES: [&str; 3] = ["buyer", "seller", "developer"];

/// A generated dev account: a name for CLI ergonomics plus the keypair
/// behind the address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevAccount {
    /// Short name usable wherever an address is expected.
    pub name: String,
    /// The account's ledger address (hex Ed25519 public key).
    pub address: Address,
    /// Hex-encoded Ed25519 secret key. Devnet only.
    pub secret_key: String,
}

/// Everything the harness persists between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// The settlement ledger.
    pub ledger: Ledger,
    /// Deployed escrow instances, settled ones included — they remain as
    /// audit records.
    pub escrows: BTreeMap<Uuid, Escrow>,
    /// Generated dev accounts.
    pub accounts: Vec<DevAccount>,
}

impl StateFile {
    /// Creates a fresh state: empty ledger, the three standard dev accounts
    /// generated and funded from the faucet.
    pub fn bootstrap() -> Result<Self> {
        let mut ledger = Ledger::new();
        let mut accounts = Vec::with_capacity(DEV_ACCOUNT_NAMES.len());

        for name in DEV_ACCOUNT_NAMES {
            let key = SigningKey::generate(&mut OsRng);
            let address = Address::from_verifying_key(&key.verifying_key());
            ledger
                .mint(&address, DEV_FAUCET_AMOUNT)
                .with_context(|| format!("failed to fund dev account '{name}'"))?;
            accounts.push(DevAccount {
                name: name.to_string(),
                address,
                secret_key: hex::encode(key.to_bytes()),
            });
        }

        Ok(Self {
            ledger,
            escrows: BTreeMap::new(),
            accounts,
        })
    }

    /// Loads state from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file {} (run `safepay init`?)", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("state file {} is corrupt", path.display()))
    }

    /// Writes state to `path`, pretty-printed so diffs stay readable.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write state file {}", path.display()))
    }

    /// Resolves a dev-account name or hex address to a ledger [`Address`].
    pub fn resolve(&self, who: &str) -> Result<Address> {
        if let Some(account) = self.accounts.iter().find(|a| a.name == who) {
            return Ok(account.address.clone());
        }
        Address::from_public_key_hex(who)
            .with_context(|| format!("'{who}' is neither a dev-account name nor a hex address"))
    }

    /// Looks up a deployed instance by id.
    pub fn escrow(&self, id: &Uuid) -> Result<&Escrow> {
        match self.escrows.get(id) {
            Some(escrow) => Ok(escrow),
            None => bail!("no escrow instance {id} in the state file"),
        }
    }

    /// The name a given address goes by, if it is a dev account.
    pub fn name_of(&self, address: &Address) -> Option<&str> {
        self.accounts
            .iter()
            .find(|a| &a.address == address)
            .map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_creates_funded_accounts() {
        let state = StateFile::bootstrap().unwrap();
        assert_eq!(state.accounts.len(), 3);
        for account in &state.accounts {
            assert_eq!(state.ledger.balance_of(&account.address), DEV_FAUCET_AMOUNT);
        }
        assert!(state.escrows.is_empty());
    }

    #[test]
    fn resolve_by_name_and_by_hex() {
        let state = StateFile::bootstrap().unwrap();
        let buyer = &state.accounts[0];

        assert_eq!(state.resolve("buyer").unwrap(), buyer.address);
        assert_eq!(state.resolve(buyer.address.as_str()).unwrap(), buyer.address);
        assert!(state.resolve("nobody").is_err());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = StateFile::bootstrap().unwrap();
        let buyer = state.resolve("buyer").unwrap();
        let seller = state.resolve("seller").unwrap();
        let developer = state.resolve("developer").unwrap();
        let escrow =
            Escrow::create(&mut state.ledger, buyer, seller, developer, 1_000).unwrap();
        let id = escrow.escrow_id;
        state.escrows.insert(id, escrow);

        state.save(&path).unwrap();
        let restored = StateFile::load(&path).unwrap();

        assert_eq!(restored.accounts.len(), 3);
        assert_eq!(restored.escrow(&id).unwrap().locked_amount, 1_000);
        assert_eq!(
            restored.ledger.balance_of(&restored.escrow(&id).unwrap().vault()),
            1_000
        );
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StateFile::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn name_of_maps_addresses_back() {
        let state = StateFile::bootstrap().unwrap();
        let seller = state.resolve("seller").unwrap();
        assert_eq!(state.name_of(&seller), Some("seller"));
    }
}
