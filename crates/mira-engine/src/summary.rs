//! Totals over a simulated month list.

use mira_core::amount::ratio_bps;
use mira_core::types::{MonthResult, TierRef};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub months: usize,
    pub total_self_recharge: u64,
    pub total_downline_recharge: u64,
    pub total_points: u64,
    pub total_coin: u64,
    pub total_cash: u64,
    /// `None` for an empty simulation.
    pub final_tier: Option<TierRef>,
    /// Months in which the tier rose.
    pub promotions: usize,
    /// Months in which the tier fell.
    pub demotions: usize,
    pub coin_return_bps: u64,
    pub cash_return_bps: u64,
}

impl SimulationSummary {
    pub fn from_results(results: &[MonthResult]) -> Self {
        let mut summary = results.iter().fold(Self::default(), |mut s, r| {
            s.months += 1;
            s.total_self_recharge = s.total_self_recharge.saturating_add(r.month.self_recharge);
            s.total_downline_recharge = s
                .total_downline_recharge
                .saturating_add(r.month.downline_recharge);
            s.total_points = s.total_points.saturating_add(r.month_points);
            s.total_coin = s.total_coin.saturating_add(r.coin_reward);
            s.total_cash = s.total_cash.saturating_add(r.cash_reward);
            s.promotions += usize::from(r.promoted());
            s.demotions += usize::from(r.degraded());
            s
        });
        summary.final_tier = results.last().map(|r| r.tier_change.current.clone());
        summary.coin_return_bps = ratio_bps(summary.total_coin, summary.total_self_recharge);
        summary.cash_return_bps = ratio_bps(summary.total_cash, summary.total_self_recharge);
        summary
    }
}
