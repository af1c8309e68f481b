//! # CLI Interface
//!
//! Defines the command-line argument structure for `safepay` using `clap`
//! derive. The binary replaces the old deploy/interact scripts: every
//! subcommand is one call against the escrow surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// SafePay escrow developer harness.
///
/// Maintains a local state file with a ledger, dev accounts, and deployed
/// escrow instances, and drives the four-read/two-write contract surface
/// against them.
#[derive(Parser, Debug)]
#[command(
    name = "safepay",
    about = "SafePay escrow developer harness",
    version,
    propagate_version = true
)]
pub struct SafePayCli {
    /// Path to the state file holding the ledger and deployed instances.
    #[arg(long, short = 's', env = "SAFEPAY_STATE", default_value = "safepay-state.json")]
    pub state: PathBuf,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "SAFEPAY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `safepay` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a fresh state file with funded buyer/seller/developer
    /// dev accounts.
    Init(InitArgs),
    /// Deploy a new escrow instance, locking the deposit from the buyer.
    Deploy(DeployArgs),
    /// Release the deposit to the seller (buyer-only).
    Release(CallArgs),
    /// Refund the deposit to the buyer (seller-only until the deadline,
    /// then open to anyone).
    Refund(CallArgs),
    /// Show an instance's status, derived flags, and balances.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing state file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `deploy` subcommand.
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Seller account: a dev-account name or a hex address.
    #[arg(long)]
    pub seller: String,

    /// Developer (fee recipient) account: a dev-account name or a hex
    /// address.
    #[arg(long)]
    pub developer: String,

    /// Deposit to lock, in smallest units.
    #[arg(long)]
    pub amount: u64,

    /// Funding account. The deployer is the buyer.
    #[arg(long, default_value = "buyer")]
    pub from: String,
}

/// Arguments for `release` and `refund`.
#[derive(Parser, Debug)]
pub struct CallArgs {
    /// The escrow instance to call.
    #[arg(long)]
    pub escrow: Uuid,

    /// Calling identity: a dev-account name or a hex address. Defaults to
    /// the party the operation is normally restricted to.
    #[arg(long = "as")]
    pub caller: Option<String>,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// The escrow instance to inspect.
    #[arg(long)]
    pub escrow: Uuid,
}
