//! The tier table: ordered reward brackets and stateless lookups over it.
//!
//! Tiers are ordered by strictly increasing threshold and the entry tier has
//! threshold 0. Seven COIN tiers lead into five CASH tiers:
//!
//! | # | Tier        | Threshold      | Rate      |
//! |---|-------------|----------------|-----------|
//! | 0 | 米拉萌芽     | 0              | COIN 0%   |
//! | 1 | 米拉一星     | 100,000        | COIN 5%   |
//! | 2 | 米拉二星     | 500,000        | COIN 10%  |
//! | 3 | 米拉三星     | 1,000,000      | COIN 12%  |
//! | 4 | 米拉四星     | 5,000,000      | COIN 15%  |
//! | 5 | 米拉五星     | 10,000,000     | COIN 18%  |
//! | 6 | 米拉六星     | 30,000,000     | COIN 20%  |
//! | 7 | 米拉合伙人   | 50,000,000     | CASH 30%  |
//! | 8 | 传奇合伙人   | 100,000,000    | CASH 40%  |
//! | 9 | 殿堂合伙人   | 200,000,000    | CASH 50%  |
//! | 10| 特约股东     | 500,000,000    | CASH 70%  |
//! | 11| 名人堂       | 1,000,000,000  | CASH 80%  |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amount::{parse_percent, snap_bps};
use crate::constants::{BPS_PRECISION, RATE_STEP_BPS};
use crate::error::TierTableError;
use crate::types::{RewardKind, Tier, TierProgress, TierRef};

/// A validated, ordered list of tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, bincode::Encode)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::coin("米拉萌芽", 0, 0),
                Tier::coin("米拉一星", 100_000, 500),
                Tier::coin("米拉二星", 500_000, 1_000),
                Tier::coin("米拉三星", 1_000_000, 1_200),
                Tier::coin("米拉四星", 5_000_000, 1_500),
                Tier::coin("米拉五星", 10_000_000, 1_800),
                Tier::coin("米拉六星", 30_000_000, 2_000),
                Tier::cash("米拉合伙人", 50_000_000, 3_000),
                Tier::cash("传奇合伙人", 100_000_000, 4_000),
                Tier::cash("殿堂合伙人", 200_000_000, 5_000),
                Tier::cash("特约股东", 500_000_000, 7_000),
                Tier::cash("名人堂", 1_000_000_000, 8_000),
            ],
        }
    }
}

impl TryFrom<Vec<Tier>> for TierTable {
    type Error = TierTableError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<TierTable> for Vec<Tier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

impl TierTable {
    /// Validate and build a tier table.
    pub fn new(tiers: Vec<Tier>) -> Result<Self, TierTableError> {
        let first = tiers.first().ok_or(TierTableError::Empty)?;
        if first.threshold != 0 {
            return Err(TierTableError::EntryThresholdNotZero(first.threshold));
        }
        for (index, tier) in tiers.iter().enumerate() {
            if index > 0 {
                let previous = tiers[index - 1].threshold;
                if tier.threshold <= previous {
                    return Err(TierTableError::ThresholdsNotIncreasing {
                        index,
                        threshold: tier.threshold,
                        previous,
                    });
                }
            }
            for bps in [tier.coin_rate_bps, tier.cash_rate_bps] {
                if bps > BPS_PRECISION {
                    return Err(TierTableError::RateOutOfRange { index, bps });
                }
            }
            let other = match tier.kind {
                RewardKind::Coin => tier.cash_rate_bps,
                RewardKind::Cash => tier.coin_rate_bps,
            };
            if other != 0 {
                return Err(TierTableError::RateKindMismatch {
                    index,
                    kind: tier.kind.to_string(),
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tier> {
        self.tiers.get(index)
    }

    /// The tier at `index`, clamped to the top tier.
    pub fn tier(&self, index: usize) -> &Tier {
        &self.tiers[index.min(self.tiers.len() - 1)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }

    pub fn as_slice(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn top_index(&self) -> usize {
        self.tiers.len() - 1
    }

    pub fn tier_ref(&self, index: usize) -> TierRef {
        let index = index.min(self.top_index());
        TierRef {
            index,
            name: self.tiers[index].name.clone(),
        }
    }

    /// Position of the tier named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.name == name)
    }

    /// Stateless lookup: the highest tier whose threshold is at most `points`.
    ///
    /// This ignores demotion history; the progression state machine in the
    /// engine is the authority for simulated months.
    pub fn resolve(&self, points: u64) -> usize {
        // Thresholds are strictly increasing and the first is 0.
        self.tiers.partition_point(|t| t.threshold <= points) - 1
    }

    /// Progress from `points` towards the tier above the resolved one.
    pub fn progress(&self, points: u64) -> TierProgress {
        self.progress_from(self.resolve(points), points)
    }

    /// Progress towards the tier above `index`, measured with `points`.
    pub fn progress_from(&self, index: usize, points: u64) -> TierProgress {
        let index = index.min(self.top_index());
        let current = self.tier_ref(index);
        match self.tiers.get(index + 1) {
            None => TierProgress {
                current,
                next: None,
                remaining: 0,
                percent: 100,
            },
            Some(next) => {
                let required = next.threshold;
                let percent = ((points as u128 * 100 + required as u128 / 2) / required as u128)
                    .min(100) as u64;
                TierProgress {
                    current,
                    next: Some(self.tier_ref(index + 1)),
                    remaining: required.saturating_sub(points),
                    percent,
                }
            }
        }
    }

    /// Points still needed this month to keep the tier at `index`.
    pub fn retention_shortfall(&self, index: usize, month_points: u64) -> u64 {
        self.tier(index).retention_floor().saturating_sub(month_points)
    }

    /// Look up a tier by selector.
    pub fn select(&self, selector: &TierSelector) -> Result<usize, TierTableError> {
        match selector {
            TierSelector::Index(i) if *i < self.tiers.len() => Ok(*i),
            TierSelector::Index(i) => Err(TierTableError::UnknownTier(i.to_string())),
            TierSelector::Name(name) => self
                .index_of(name)
                .ok_or_else(|| TierTableError::UnknownTier(name.clone())),
        }
    }

    /// A copy of this table with the rate overrides applied in order.
    ///
    /// Each override replaces the rate of the tier's own reward kind.
    pub fn with_overrides(&self, overrides: &[RateOverride]) -> Result<Self, TierTableError> {
        let mut tiers = self.tiers.clone();
        for o in overrides {
            let index = self.select(&o.tier)?;
            tiers[index].set_rate_bps(o.rate_bps);
        }
        Ok(Self { tiers })
    }
}

/// Identifies a tier by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierSelector {
    Index(usize),
    Name(String),
}

impl From<&str> for TierSelector {
    fn from(key: &str) -> Self {
        let key = key.trim();
        match key.parse::<usize>() {
            Ok(i) => Self::Index(i),
            Err(_) => Self::Name(key.to_string()),
        }
    }
}

impl fmt::Display for TierSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(n) => write!(f, "{n}"),
        }
    }
}

/// A per-tier rate override, as edited by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateOverride {
    pub tier: TierSelector,
    pub rate_bps: u64,
}

impl RateOverride {
    /// The rate snaps to the nearest 0.5% step and clamps to 100%.
    pub fn new(tier: impl Into<TierSelector>, rate_bps: u64) -> Self {
        Self {
            tier: tier.into(),
            rate_bps: snap_bps(rate_bps, RATE_STEP_BPS),
        }
    }
}

impl FromStr for RateOverride {
    type Err = TierTableError;

    /// Parse `TIER=PCT`. The percentage is coerced like any other user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tier, pct) = s
            .split_once('=')
            .ok_or_else(|| TierTableError::UnknownTier(s.to_string()))?;
        if tier.trim().is_empty() {
            return Err(TierTableError::UnknownTier(s.to_string()));
        }
        Ok(Self::new(tier, parse_percent(pct)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_table_is_valid() {
        let table = TierTable::default();
        assert!(TierTable::new(table.as_slice().to_vec()).is_ok());
        assert_eq!(table.len(), 12);
        assert_eq!(table.tier(0).threshold, 0);
    }

    #[test]
    fn default_thresholds_strictly_increase() {
        let table = TierTable::default();
        for w in table.as_slice().windows(2) {
            assert!(w[0].threshold < w[1].threshold, "{} !< {}", w[0].name, w[1].name);
        }
    }

    #[test]
    fn default_rates_match_kind() {
        for t in TierTable::default().iter() {
            match t.kind {
                RewardKind::Coin => assert_eq!(t.cash_rate_bps, 0, "{}", t.name),
                RewardKind::Cash => assert_eq!(t.coin_rate_bps, 0, "{}", t.name),
            }
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(TierTable::new(vec![]), Err(TierTableError::Empty));
    }

    #[test]
    fn rejects_nonzero_entry() {
        let err = TierTable::new(vec![Tier::coin("a", 5, 0)]).unwrap_err();
        assert_eq!(err, TierTableError::EntryThresholdNotZero(5));
    }

    #[test]
    fn rejects_non_increasing() {
        let err = TierTable::new(vec![
            Tier::coin("a", 0, 0),
            Tier::coin("b", 100, 0),
            Tier::coin("c", 100, 0),
        ])
        .unwrap_err();
        assert!(matches!(err, TierTableError::ThresholdsNotIncreasing { index: 2, .. }));
    }

    #[test]
    fn rejects_rate_out_of_range() {
        let err = TierTable::new(vec![Tier::coin("a", 0, 10_001)]).unwrap_err();
        assert_eq!(err, TierTableError::RateOutOfRange { index: 0, bps: 10_001 });
    }

    #[test]
    fn rejects_mixed_kind_rates() {
        let mut bad = Tier::coin("a", 0, 100);
        bad.cash_rate_bps = 100;
        let err = TierTable::new(vec![bad]).unwrap_err();
        assert!(matches!(err, TierTableError::RateKindMismatch { index: 0, .. }));
    }

    #[test]
    fn resolve_boundaries() {
        let table = TierTable::default();
        assert_eq!(table.resolve(0), 0);
        assert_eq!(table.resolve(99_999), 0);
        assert_eq!(table.resolve(100_000), 1);
        assert_eq!(table.resolve(2_000_000), 3);
        assert_eq!(table.resolve(32_000_000), 6);
        assert_eq!(table.tier(table.resolve(32_000_000)).name, "米拉六星");
        assert_eq!(table.resolve(u64::MAX), 11);
    }

    #[test]
    fn progress_towards_next() {
        let table = TierTable::default();
        // 82M points as 米拉合伙人 towards 传奇合伙人 (100M).
        let p = table.progress(82_000_000);
        assert_eq!(p.current.name, "米拉合伙人");
        assert_eq!(p.next.as_ref().unwrap().name, "传奇合伙人");
        assert_eq!(p.remaining, 18_000_000);
        assert_eq!(p.percent, 82);
    }

    #[test]
    fn progress_at_top_tier() {
        let table = TierTable::default();
        let p = table.progress(2_000_000_000);
        assert_eq!(p.current.index, 11);
        assert!(p.next.is_none());
        assert_eq!(p.remaining, 0);
        assert_eq!(p.percent, 100);
    }

    #[test]
    fn progress_percent_capped_when_ahead_of_state() {
        // A demoted account may hold more points than the next threshold.
        let table = TierTable::default();
        let p = table.progress_from(1, 900_000);
        assert_eq!(p.percent, 100);
        assert_eq!(p.remaining, 0);
    }

    #[test]
    fn retention_shortfall_matches_dashboard() {
        let table = TierTable::default();
        // 米拉五星 (10M) needs 2M per month; 1.6M earned leaves 400k.
        assert_eq!(table.retention_shortfall(5, 1_600_000), 400_000);
        assert_eq!(table.retention_shortfall(5, 2_200_000), 0);
        assert_eq!(table.retention_shortfall(0, 0), 0);
    }

    #[test]
    fn overrides_by_name_and_index() {
        let table = TierTable::default();
        let t = table
            .with_overrides(&[
                RateOverride::new("米拉三星", 0),
                RateOverride::new("7", 3_550),
            ])
            .unwrap();
        assert_eq!(t.tier(3).coin_rate_bps, 0);
        assert_eq!(t.tier(7).cash_rate_bps, 3_550);
        assert_eq!(t.tier(7).coin_rate_bps, 0);
        // Source table untouched.
        assert_eq!(table.tier(3).coin_rate_bps, 1_200);
    }

    #[test]
    fn override_unknown_tier() {
        let table = TierTable::default();
        assert_eq!(
            table.with_overrides(&[RateOverride::new("青铜", 100)]),
            Err(TierTableError::UnknownTier("青铜".into()))
        );
        assert!(table.with_overrides(&[RateOverride::new("12", 100)]).is_err());
    }

    #[test]
    fn parse_override() {
        let o: RateOverride = "米拉一星=5.5".parse().unwrap();
        assert_eq!(o.tier, TierSelector::Name("米拉一星".into()));
        assert_eq!(o.rate_bps, 550);

        let o: RateOverride = "3 = 150".parse().unwrap();
        assert_eq!(o.tier, TierSelector::Index(3));
        assert_eq!(o.rate_bps, BPS_PRECISION);

        let o: RateOverride = "2=abc".parse().unwrap();
        assert_eq!(o.rate_bps, 0);

        let o: RateOverride = "7=33.3".parse().unwrap();
        assert_eq!(o.rate_bps, 3_350);
        let o: RateOverride = "7=33.2".parse().unwrap();
        assert_eq!(o.rate_bps, 3_300);

        assert!("no-equals".parse::<RateOverride>().is_err());
        assert!("=5".parse::<RateOverride>().is_err());
    }

    #[test]
    fn serde_validates_on_load() {
        let json = serde_json::to_string(&TierTable::default()).unwrap();
        let back: TierTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TierTable::default());

        let bad = r#"[{"name":"a","threshold":3,"kind":"COIN","coin_rate_bps":0,"cash_rate_bps":0}]"#;
        assert!(serde_json::from_str::<TierTable>(bad).is_err());
    }

    proptest! {
        #[test]
        fn resolve_matches_linear_scan(points in 0u64..2_000_000_000u64) {
            let table = TierTable::default();
            let mut expected = 0;
            for (i, t) in table.iter().enumerate() {
                if points >= t.threshold {
                    expected = i;
                } else {
                    break;
                }
            }
            prop_assert_eq!(table.resolve(points), expected);
        }

        #[test]
        fn resolve_is_monotonic(a in 0u64..2_000_000_000u64, b in 0u64..2_000_000_000u64) {
            let table = TierTable::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.resolve(lo) <= table.resolve(hi));
        }
    }
}
