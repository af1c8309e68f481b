//! # Fee Distribution
//!
//! Splits a release payout between the seller and the platform developer.
//! Integer basis-point arithmetic, remainder to the seller, so the two
//! shares always reconstruct the locked amount exactly. No dust is created
//! and none is lost.
//!
//! The refund path never touches this module — a refunded buyer gets 100%
//! of the deposit back, because no service was rendered.

use serde::{Deserialize, Serialize};

use crate::config::{BPS_DENOMINATOR, DEVELOPER_FEE_BPS};

/// The fee policy baked into an escrow instance at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Platform fee in basis points (1 bp = 0.01%).
    pub rate_bps: u32,
}

/// The result of splitting a locked amount at release.
///
/// Invariant: `seller_payout + developer_fee` equals the input amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// What the seller receives.
    pub seller_payout: u64,
    /// What the platform developer receives.
    pub developer_fee: u64,
}

impl FeeSchedule {
    /// A schedule with an explicit rate.
    pub fn new(rate_bps: u32) -> Self {
        Self { rate_bps }
    }

    /// Computes the seller/developer split for `amount`.
    ///
    /// The fee is `amount * rate_bps / 10_000`, truncated; the remainder
    /// goes to the seller. The u128 intermediate means the product cannot
    /// overflow for any `u64` amount and `u32` rate, and the fee is capped
    /// at `amount` so a rate above 10_000 bps can never underflow the
    /// seller share.
    pub fn split(&self, amount: u64) -> FeeSplit {
        let fee = (amount as u128 * self.rate_bps as u128 / BPS_DENOMINATOR as u128)
            .min(amount as u128) as u64;
        FeeSplit {
            seller_payout: amount - fee,
            developer_fee: fee,
        }
    }
}

impl Default for FeeSchedule {
    /// The platform-wide rate from [`crate::config`].
    fn default() -> Self {
        Self::new(DEVELOPER_FEE_BPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_split_at_300_bps() {
        // 1.0 at 9 decimals, 3% fee: seller 0.97, developer 0.03.
        let split = FeeSchedule::new(300).split(1_000_000_000);
        assert_eq!(split.seller_payout, 970_000_000);
        assert_eq!(split.developer_fee, 30_000_000);
    }

    #[test]
    fn shares_always_sum_to_amount() {
        let schedule = FeeSchedule::default();
        for amount in [0, 1, 2, 3, 33, 9_999, 10_000, 10_001, u64::MAX] {
            let split = schedule.split(amount);
            assert_eq!(split.seller_payout + split.developer_fee, amount);
        }
    }

    #[test]
    fn truncation_favors_seller() {
        // 33 units at 3%: fee truncates to 0, the seller gets all 33.
        let split = FeeSchedule::new(300).split(33);
        assert_eq!(split.developer_fee, 0);
        assert_eq!(split.seller_payout, 33);
    }

    #[test]
    fn zero_rate_pays_seller_everything() {
        let split = FeeSchedule::new(0).split(12_345);
        assert_eq!(split.seller_payout, 12_345);
        assert_eq!(split.developer_fee, 0);
    }

    #[test]
    fn max_amount_does_not_overflow() {
        let split = FeeSchedule::new(9_999).split(u64::MAX);
        assert_eq!(split.seller_payout + split.developer_fee, u64::MAX);
    }

    #[test]
    fn absurd_rate_is_capped_at_the_whole_amount() {
        let split = FeeSchedule::new(25_000).split(1_000);
        assert_eq!(split.developer_fee, 1_000);
        assert_eq!(split.seller_payout, 0);
    }
}
