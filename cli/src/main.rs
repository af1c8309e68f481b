// Copyright (c) 2026 SafePay Team. MIT License.
// See LICENSE for details.

//! # SafePay CLI
//!
//! Entry point for the `safepay` binary: a local harness that stands in for
//! the old deploy/interact scripts. It keeps a ledger and deployed escrow
//! instances in a JSON state file and drives the contract surface against
//! them:
//!
//! - `init`    — create the state file with funded dev accounts
//! - `deploy`  — deploy an escrow instance, locking the buyer's deposit
//! - `release` — buyer releases the deposit to the seller
//! - `refund`  — seller (or anyone after the deadline) refunds the buyer
//! - `status`  — inspect an instance and the relevant balances
//! - `version` — print build version information

mod cli;
mod logging;
mod store;

use anyhow::{bail, Context, Result};
use clap::Parser;

use safepay_contracts::{Escrow, EscrowEvent};
use safepay_ledger::Address;

use cli::{CallArgs, Commands, DeployArgs, InitArgs, SafePayCli, StatusArgs};
use logging::LogFormat;
use store::StateFile;

fn main() -> Result<()> {
    let cli = SafePayCli::parse();
    logging::init_logging(
        "safepay=info,safepay_contracts=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Init(args) => init(&cli.state, args),
        Commands::Deploy(args) => deploy(&cli.state, args),
        Commands::Release(args) => release(&cli.state, args),
        Commands::Refund(args) => refund(&cli.state, args),
        Commands::Status(args) => status(&cli.state, args),
        Commands::Version => {
            println!("safepay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Creates a fresh state file with the three standard dev accounts.
fn init(path: &std::path::Path, args: InitArgs) -> Result<()> {
    if path.exists() && !args.force {
        bail!(
            "state file {} already exists (pass --force to overwrite)",
            path.display()
        );
    }

    let state = StateFile::bootstrap().context("failed to bootstrap state")?;
    state.save(path)?;

    tracing::info!(path = %path.display(), "state file initialized");
    println!("State initialized at {}", path.display());
    for account in &state.accounts {
        println!(
            "  {:<10} {}  balance {}",
            account.name,
            account.address,
            state.ledger.balance_of(&account.address)
        );
    }
    Ok(())
}

/// Deploys one escrow instance per invocation, exactly like the original
/// one-contract-per-transaction model.
fn deploy(path: &std::path::Path, args: DeployArgs) -> Result<()> {
    let mut state = StateFile::load(path)?;

    let buyer = state.resolve(&args.from)?;
    let seller = state.resolve(&args.seller)?;
    let developer = state.resolve(&args.developer)?;

    let escrow = Escrow::create(&mut state.ledger, buyer, seller, developer, args.amount)
        .context("deployment failed")?;
    let id = escrow.escrow_id;

    tracing::info!(
        escrow = %id,
        buyer = %escrow.buyer,
        seller = %escrow.seller,
        amount = escrow.locked_amount,
        deadline = %escrow.refund_deadline(),
        "escrow deployed"
    );

    state.escrows.insert(id, escrow);
    state.save(path)?;

    println!("{id}");
    Ok(())
}

/// Buyer-gated release: pays the seller and the platform developer.
fn release(path: &std::path::Path, args: CallArgs) -> Result<()> {
    let mut state = StateFile::load(path)?;
    let caller = resolve_caller(&state, &args, |escrow| escrow.buyer.clone())?;

    let StateFile {
        ledger, escrows, ..
    } = &mut state;
    let escrow = escrows
        .get_mut(&args.escrow)
        .with_context(|| format!("no escrow instance {} in the state file", args.escrow))?;

    let event = escrow
        .release_funds(ledger, &caller)
        .context("release failed")?;

    if let EscrowEvent::Released {
        ref seller,
        seller_payout,
        developer_fee,
    } = event
    {
        tracing::info!(
            escrow = %args.escrow,
            seller = %seller,
            seller_payout,
            developer_fee,
            "funds released"
        );
        println!("Released: seller receives {seller_payout}, developer fee {developer_fee}");
    }

    state.save(path)?;
    Ok(())
}

/// Seller-gated (or post-deadline permissionless) refund.
fn refund(path: &std::path::Path, args: CallArgs) -> Result<()> {
    let mut state = StateFile::load(path)?;
    let caller = resolve_caller(&state, &args, |escrow| escrow.seller.clone())?;

    let StateFile {
        ledger, escrows, ..
    } = &mut state;
    let escrow = escrows
        .get_mut(&args.escrow)
        .with_context(|| format!("no escrow instance {} in the state file", args.escrow))?;

    let event = escrow.refund(ledger, &caller).context("refund failed")?;

    if let EscrowEvent::Refunded { ref buyer, amount } = event {
        tracing::info!(escrow = %args.escrow, buyer = %buyer, amount, "deposit refunded");
        println!("Refunded: buyer receives {amount}");
    }

    state.save(path)?;
    Ok(())
}

/// Prints an instance's status, derived flags, and the balances a client
/// would display.
fn status(path: &std::path::Path, args: StatusArgs) -> Result<()> {
    let state = StateFile::load(path)?;
    let escrow = state.escrow(&args.escrow)?;

    println!("escrow        {}", escrow.escrow_id);
    println!("status        {}", escrow.status);
    println!("is_completed  {}", escrow.is_completed());
    println!("is_refunded   {}", escrow.is_refunded());
    println!("locked_amount {}", escrow.locked_amount);
    println!("deadline      {} (elapsed: {})", escrow.refund_deadline(), escrow.deadline_elapsed());
    for (label, address) in [
        ("buyer", &escrow.buyer),
        ("seller", &escrow.seller),
        ("developer", &escrow.developer),
    ] {
        let name = state.name_of(address).unwrap_or("-");
        println!(
            "{label:<10}    {address}  ({name})  balance {}",
            state.ledger.balance_of(address)
        );
    }
    println!("vault         {}  balance {}", escrow.vault(), state.ledger.balance_of(&escrow.vault()));
    Ok(())
}

/// The explicit `--as` identity, or the operation's default party.
fn resolve_caller(
    state: &StateFile,
    args: &CallArgs,
    default_party: impl Fn(&Escrow) -> Address,
) -> Result<Address> {
    match &args.caller {
        Some(who) => state.resolve(who),
        None => Ok(default_party(state.escrow(&args.escrow)?)),
    }
}
