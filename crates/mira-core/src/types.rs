//! Core domain types: tiers, monthly inputs and derived monthly results.
//!
//! Currency amounts are in fen, COIN amounts in hundredths of a coin,
//! rates in basis points and points in whole Mira.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::{clamp_bps, yuan_to_fen};
use crate::constants::{
    BPS_PRECISION, CERTIFICATION_BONUS_MIRA, DEFAULT_UPLINE_SHARE_BPS, LEVEL50_BONUS_MIRA,
    LIVESTREAM_MIRA_PER_HOUR, MIRA_PER_FEN, REGISTRATION_BONUS_MIRA, RETENTION_FLOOR_BPS,
    SETTLEMENT_RATIO_BPS,
};

/// The currency a tier pays its rewards in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
    bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RewardKind {
    /// In-game coin rebate.
    #[default]
    Coin,
    /// Cash revenue share.
    Cash,
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coin => write!(f, "COIN"),
            Self::Cash => write!(f, "CASH"),
        }
    }
}

/// A reward bracket, ranked by its points threshold.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Tier {
    pub name: String,
    /// Status points needed to enter this tier.
    pub threshold: u64,
    pub kind: RewardKind,
    pub coin_rate_bps: u64,
    pub cash_rate_bps: u64,
}

impl Tier {
    /// A tier paying COIN at `rate_bps`.
    pub fn coin(name: impl Into<String>, threshold: u64, rate_bps: u64) -> Self {
        Self {
            name: name.into(),
            threshold,
            kind: RewardKind::Coin,
            coin_rate_bps: rate_bps,
            cash_rate_bps: 0,
        }
    }

    /// A tier paying CASH at `rate_bps`.
    pub fn cash(name: impl Into<String>, threshold: u64, rate_bps: u64) -> Self {
        Self {
            name: name.into(),
            threshold,
            kind: RewardKind::Cash,
            coin_rate_bps: 0,
            cash_rate_bps: rate_bps,
        }
    }

    /// The rate matching this tier's reward kind.
    pub fn rate_bps(&self) -> u64 {
        match self.kind {
            RewardKind::Coin => self.coin_rate_bps,
            RewardKind::Cash => self.cash_rate_bps,
        }
    }

    /// Replace the rate of this tier's own kind, clamped to 100%.
    pub fn set_rate_bps(&mut self, bps: u64) {
        let bps = clamp_bps(bps);
        match self.kind {
            RewardKind::Coin => self.coin_rate_bps = bps,
            RewardKind::Cash => self.cash_rate_bps = bps,
        }
    }

    /// Minimum new points per month needed to count as retained at this tier.
    ///
    /// `ceil(threshold * 20%)`, so a month meets the floor exactly when
    /// `month_points * 5 >= threshold`.
    pub fn retention_floor(&self) -> u64 {
        let num = self.threshold as u128 * RETENTION_FLOOR_BPS as u128;
        num.div_ceil(BPS_PRECISION as u128) as u64
    }

    /// Whether `month_points` falls under the retention floor.
    ///
    /// Always false for a zero-threshold tier.
    pub fn misses_retention(&self, month_points: u64) -> bool {
        self.threshold > 0
            && (month_points as u128) * (BPS_PRECISION as u128)
                < (self.threshold as u128) * (RETENTION_FLOOR_BPS as u128)
    }
}

/// Points credited for non-recharge activity within a month.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    bincode::Encode, bincode::Decode,
)]
pub struct BonusActivity {
    /// Invitees who registered.
    pub registrations: u64,
    /// Invitees who reached level 50.
    pub level50_invitees: u64,
    pub livestream_hours: u64,
    /// Driver or courier certifications.
    pub certifications: u64,
}

impl BonusActivity {
    pub fn registration_points(&self) -> u64 {
        self.registrations.saturating_mul(REGISTRATION_BONUS_MIRA)
    }

    pub fn level50_points(&self) -> u64 {
        self.level50_invitees.saturating_mul(LEVEL50_BONUS_MIRA)
    }

    pub fn livestream_points(&self) -> u64 {
        self.livestream_hours.saturating_mul(LIVESTREAM_MIRA_PER_HOUR)
    }

    pub fn certification_points(&self) -> u64 {
        self.certifications.saturating_mul(CERTIFICATION_BONUS_MIRA)
    }

    /// Total bonus points.
    pub fn points(&self) -> u64 {
        self.registration_points()
            .saturating_add(self.level50_points())
            .saturating_add(self.livestream_points())
            .saturating_add(self.certification_points())
    }

    pub fn is_empty(&self) -> bool {
        self.points() == 0
    }
}

/// One month of simulation input.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    bincode::Encode, bincode::Decode,
)]
pub struct MonthInput {
    pub label: String,
    /// Own recharge in fen.
    pub self_recharge: u64,
    /// Direct downline recharge in fen.
    pub downline_recharge: u64,
    #[serde(default)]
    pub bonus: BonusActivity,
}

impl MonthInput {
    /// Build a month from whole-yuan recharge amounts.
    pub fn from_yuan(label: impl Into<String>, self_yuan: u64, downline_yuan: u64) -> Self {
        Self {
            label: label.into(),
            self_recharge: yuan_to_fen(self_yuan),
            downline_recharge: yuan_to_fen(downline_yuan),
            bonus: BonusActivity::default(),
        }
    }

    pub fn with_bonus(mut self, bonus: BonusActivity) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn self_points(&self) -> u64 {
        self.self_recharge.saturating_mul(MIRA_PER_FEN)
    }

    pub fn team_points(&self) -> u64 {
        self.downline_recharge.saturating_mul(MIRA_PER_FEN)
    }

    /// All new points earned this month: recharges plus bonus activity.
    pub fn month_points(&self) -> u64 {
        self.self_points()
            .saturating_add(self.team_points())
            .saturating_add(self.bonus.points())
    }

    /// The month as seen by the simulated downline account: its own
    /// recharge is this month's downline recharge, and nothing sits below it.
    pub fn as_downline(&self) -> Self {
        Self {
            label: self.label.clone(),
            self_recharge: self.downline_recharge,
            downline_recharge: 0,
            bonus: BonusActivity::default(),
        }
    }
}

/// Ratios that parameterise one simulation pass.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
    bincode::Encode, bincode::Decode,
)]
pub struct SimulationParams {
    /// Fraction of a recharge payable as rewards.
    pub settlement_ratio_bps: u64,
    /// Fraction of the downline's settlement credited to this account.
    pub upline_share_bps: u64,
    /// Fraction of this account's own settlement forwarded further up.
    pub upstream_share_bps: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            settlement_ratio_bps: SETTLEMENT_RATIO_BPS,
            upline_share_bps: DEFAULT_UPLINE_SHARE_BPS,
            upstream_share_bps: 0,
        }
    }
}

impl SimulationParams {
    /// Parameters for a top-level account: nothing forwarded upstream.
    pub fn top_level(upline_share_bps: u64) -> Self {
        Self {
            upline_share_bps: clamp_bps(upline_share_bps),
            ..Self::default()
        }
    }

    /// Parameters for the simulated downline of an account using `self`:
    /// it forwards the upline share and has no team of its own.
    pub fn downline_of(&self) -> Self {
        Self {
            settlement_ratio_bps: self.settlement_ratio_bps,
            upline_share_bps: self.upline_share_bps,
            upstream_share_bps: self.upline_share_bps,
        }
    }

    /// Every ratio clamped into `[0, 100]%`.
    pub fn clamped(&self) -> Self {
        Self {
            settlement_ratio_bps: clamp_bps(self.settlement_ratio_bps),
            upline_share_bps: clamp_bps(self.upline_share_bps),
            upstream_share_bps: clamp_bps(self.upstream_share_bps),
        }
    }

    /// The complementary self share of the distribution ratio.
    pub fn self_share_bps(&self) -> u64 {
        BPS_PRECISION - clamp_bps(self.upline_share_bps)
    }
}

/// Reference to a tier by position and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierRef {
    pub index: usize,
    pub name: String,
}

/// Tier movement during one month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierChange {
    pub previous: TierRef,
    pub current: TierRef,
    /// Set when the month promoted; the tier reached.
    pub promotion: Option<TierRef>,
    /// Set when the month demoted; the tier fallen to.
    pub degraded: Option<TierRef>,
    /// Consecutive below-floor months at the current tier after this month.
    pub miss_streak: u32,
}

/// Distance to the next tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierProgress {
    pub current: TierRef,
    /// `None` at the top tier.
    pub next: Option<TierRef>,
    /// Points still missing to reach `next`.
    pub remaining: u64,
    /// Whole percent towards `next`, capped at 100.
    pub percent: u64,
}

/// Numeric output of settling one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settlement {
    pub kind: RewardKind,
    pub rate_bps: u64,
    /// `self_recharge * settlement_ratio * rate`.
    pub raw_self_reward: u64,
    /// Raw self reward after forwarding the upstream share.
    pub self_reward: u64,
    /// The portion of the raw self reward forwarded upstream.
    pub forwarded: u64,
    /// `downline_recharge * settlement_ratio * rate`.
    pub downline_settlement: u64,
    /// The slice of the downline settlement credited to this account.
    pub upline_share: u64,
    pub coin_reward: u64,
    pub cash_reward: u64,
}

/// Rate assumptions applied to the downline settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assumptions {
    pub downline_rate_kind: RewardKind,
    pub downline_rate_bps: u64,
    pub settlement_ratio_bps: u64,
    pub upline_share_bps: u64,
    pub upstream_share_bps: u64,
}

/// Human-readable formula lines, one list per logical step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalculationTrace {
    pub mira: Vec<String>,
    pub tier: Vec<String>,
    pub coin: Vec<String>,
    pub cash: Vec<String>,
}

/// Everything derived for one month. Recomputed from scratch, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthResult {
    pub month: MonthInput,
    pub month_points: u64,
    /// Lifetime total, never clamped.
    pub cumulative_points: u64,
    /// Running total used for tier decisions; clamped on demotion.
    pub status_points: u64,
    pub tier: Tier,
    pub tier_change: TierChange,
    pub settlement: Settlement,
    pub coin_reward: u64,
    pub cash_reward: u64,
    /// COIN reward over own recharge.
    pub coin_return_bps: u64,
    /// CASH reward over own recharge.
    pub cash_return_bps: u64,
    /// Points still needed this month to meet the retention floor.
    pub retention_shortfall: u64,
    pub progress: TierProgress,
    pub assumptions: Assumptions,
    pub calculations: CalculationTrace,
}

impl MonthResult {
    pub fn promoted(&self) -> bool {
        self.tier_change.promotion.is_some()
    }

    pub fn degraded(&self) -> bool {
        self.tier_change.degraded.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_rate_follows_kind() {
        let coin = Tier::coin("c", 100, 500);
        let cash = Tier::cash("k", 200, 3_000);
        assert_eq!(coin.rate_bps(), 500);
        assert_eq!(cash.rate_bps(), 3_000);
    }

    #[test]
    fn set_rate_clamps_and_keeps_other_kind_zero() {
        let mut t = Tier::cash("k", 200, 3_000);
        t.set_rate_bps(25_000);
        assert_eq!(t.cash_rate_bps, BPS_PRECISION);
        assert_eq!(t.coin_rate_bps, 0);
    }

    #[test]
    fn retention_floor_is_twenty_percent() {
        let t = Tier::coin("c", 30_000_000, 2_000);
        assert_eq!(t.retention_floor(), 6_000_000);
        assert!(t.misses_retention(5_999_999));
        assert!(!t.misses_retention(6_000_000));
    }

    #[test]
    fn retention_floor_rounds_up() {
        let t = Tier::coin("c", 7, 0);
        // 20% of 7 = 1.4, so 1 point misses and 2 points meet it.
        assert_eq!(t.retention_floor(), 2);
        assert!(t.misses_retention(1));
        assert!(!t.misses_retention(2));
    }

    #[test]
    fn zero_threshold_never_misses() {
        let t = Tier::coin("entry", 0, 0);
        assert!(!t.misses_retention(0));
        assert_eq!(t.retention_floor(), 0);
    }

    #[test]
    fn month_points_include_bonus() {
        let m = MonthInput::from_yuan("m", 100_000, 200_000).with_bonus(BonusActivity {
            registrations: 10,
            level50_invitees: 10,
            livestream_hours: 0,
            certifications: 0,
        });
        assert_eq!(m.self_points(), 10_000_000);
        assert_eq!(m.team_points(), 20_000_000);
        assert_eq!(m.month_points(), 32_000_000);
    }

    #[test]
    fn bonus_livestream_and_certifications() {
        let b = BonusActivity {
            livestream_hours: 50,
            certifications: 2,
            ..BonusActivity::default()
        };
        assert_eq!(b.points(), 3_000_000 + 1_000_000);
        assert!(!b.is_empty());
        assert!(BonusActivity::default().is_empty());
    }

    #[test]
    fn as_downline_moves_team_recharge_to_self() {
        let m = MonthInput::from_yuan("m", 10, 20).with_bonus(BonusActivity {
            registrations: 1,
            ..BonusActivity::default()
        });
        let d = m.as_downline();
        assert_eq!(d.self_recharge, 2_000);
        assert_eq!(d.downline_recharge, 0);
        assert!(d.bonus.is_empty());
        assert_eq!(d.label, "m");
    }

    #[test]
    fn params_presets() {
        let top = SimulationParams::top_level(3_000);
        assert_eq!(top.upstream_share_bps, 0);
        assert_eq!(top.settlement_ratio_bps, SETTLEMENT_RATIO_BPS);
        assert_eq!(top.self_share_bps(), 7_000);

        let down = top.downline_of();
        assert_eq!(down.upstream_share_bps, 3_000);
        assert_eq!(down.upline_share_bps, 3_000);
    }

    #[test]
    fn params_clamped() {
        let p = SimulationParams {
            settlement_ratio_bps: 20_000,
            upline_share_bps: 10_001,
            upstream_share_bps: 5,
        };
        let c = p.clamped();
        assert_eq!(c.settlement_ratio_bps, BPS_PRECISION);
        assert_eq!(c.upline_share_bps, BPS_PRECISION);
        assert_eq!(c.upstream_share_bps, 5);
    }

    #[test]
    fn reward_kind_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RewardKind::Cash).unwrap(), "\"CASH\"");
        assert_eq!(RewardKind::Coin.to_string(), "COIN");
    }
}
