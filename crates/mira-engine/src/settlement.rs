//! Settlement engine implementing the [`SettlementCalculator`] trait.
//!
//! For a month settled at a tier with rate `r` (the rate of the tier's own
//! reward kind) and settlement ratio `s`:
//!
//! ```text
//! raw_self_reward     = self_recharge     * s * r
//! self_reward         = raw_self_reward   * (1 - upstream_share)
//! downline_settlement = downline_recharge * s * r
//! upline_share        = downline_settlement * upline_share_ratio
//! total               = self_reward + upline_share   (paid in the tier's kind)
//! ```
//!
//! Each product rounds half-up to the nearest fen.

use mira_core::amount::{mul_bps, mul_bps2};
use mira_core::constants::BPS_PRECISION;
use mira_core::traits::SettlementCalculator;
use mira_core::types::{MonthInput, RewardKind, Settlement, SimulationParams, Tier};

/// The production settlement calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine;

impl SettlementEngine {
    pub fn new() -> Self {
        Self
    }
}

/// `recharge * settlement_ratio * rate`, zero when either side is zero.
fn settle_recharge(recharge: u64, settlement_ratio_bps: u64, rate_bps: u64) -> u64 {
    if recharge == 0 || rate_bps == 0 {
        return 0;
    }
    mul_bps2(recharge, settlement_ratio_bps, rate_bps)
}

impl SettlementCalculator for SettlementEngine {
    fn settle(&self, month: &MonthInput, tier: &Tier, params: &SimulationParams) -> Settlement {
        let p = params.clamped();
        let rate_bps = tier.rate_bps().min(BPS_PRECISION);

        let raw_self_reward = settle_recharge(month.self_recharge, p.settlement_ratio_bps, rate_bps);
        let self_reward = mul_bps(raw_self_reward, BPS_PRECISION - p.upstream_share_bps);
        let forwarded = raw_self_reward - self_reward;

        let downline_settlement =
            settle_recharge(month.downline_recharge, p.settlement_ratio_bps, rate_bps);
        let upline_share = mul_bps(downline_settlement, p.upline_share_bps);

        let total = self_reward.saturating_add(upline_share);
        let (coin_reward, cash_reward) = match tier.kind {
            RewardKind::Coin => (total, 0),
            RewardKind::Cash => (0, total),
        };

        Settlement {
            kind: tier.kind,
            rate_bps,
            raw_self_reward,
            self_reward,
            forwarded,
            downline_settlement,
            upline_share,
            coin_reward,
            cash_reward,
        }
    }
}
