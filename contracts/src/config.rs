//! # Platform Constants
//!
//! Every policy number in SafePay lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team
//! coffee.
//!
//! These values are fixed per deployment. Deployed escrow instances bake
//! them in at creation time, so changing a constant never rewrites the
//! terms of an instance that already holds someone's money.

/// Basis points in a whole: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Platform fee taken from every successful release, in basis points.
/// 300 bps = 3.00%. The fee is carved out of the seller payout — the buyer
/// never pays more than the locked deposit.
pub const DEVELOPER_FEE_BPS: u32 = 300;

/// How long a seller has before the refund path opens to everyone.
///
/// Seven days. After `created_at + REFUND_TIMEOUT_SECS`, *any* caller may
/// trigger the refund — the point of the timeout is to protect the buyer
/// from an unresponsive seller, so it must not itself be a privileged
/// operation.
pub const REFUND_TIMEOUT_SECS: i64 = 7 * 24 * 60 * 60;

/// Initial balance minted to each generated dev account. Arbitrary but
/// large enough to run every reference scenario without refilling.
pub const DEV_FAUCET_AMOUNT: u64 = 10_000_000_000;
