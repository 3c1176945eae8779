//! Tier progression state machine.
//!
//! [`ProgressionState`] is the accumulator threaded through the monthly
//! fold. Each month adds its new points to both the lifetime total and the
//! status total, then applies, in order:
//!
//! 1. **Promotion**: climb while the next tier's threshold is non-zero and
//!    reached by status points. Any climb resets the miss streak and skips
//!    the demotion check.
//! 2. **Demotion**: a month under 20% of the current (non-zero) threshold is
//!    a miss; the second consecutive miss at a non-entry tier drops one tier,
//!    resets the streak and clamps status points to the lower threshold.
//!    Any other month resets the streak.
//!
//! Because demotion clamps status points, the state cannot be derived from
//! the lifetime total alone and months must be applied in order.

use mira_core::constants::DEMOTION_MISS_LIMIT;
use mira_core::tiers::TierTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Accumulated progression state after some number of months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressionState {
    pub tier_index: usize,
    pub miss_streak: u32,
    /// Running total used for tier decisions.
    pub status_points: u64,
    /// Lifetime total, never clamped.
    pub cumulative_points: u64,
}

/// What happened to the tier during one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Climbed one or more tiers.
    Promoted,
    /// Dropped one tier after consecutive misses.
    Demoted,
    /// Under the retention floor, streak not yet long enough.
    Missed,
    /// Met the retention floor, or sits at a zero-threshold tier.
    Retained,
}

/// The outcome of applying one month to a [`ProgressionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub previous: usize,
    pub current: usize,
    /// Status points before any demotion clamp.
    pub unclamped_status: u64,
}

impl ProgressionState {
    /// Entry tier, no points, no misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one month's new points and return the next state.
    pub fn advance(self, table: &TierTable, month_points: u64) -> (Self, Transition) {
        let previous = self.tier_index.min(table.top_index());
        let mut next = Self {
            tier_index: previous,
            miss_streak: self.miss_streak,
            status_points: self.status_points.saturating_add(month_points),
            cumulative_points: self.cumulative_points.saturating_add(month_points),
        };
        let unclamped_status = next.status_points;

        let mut index = previous;
        while let Some(tier) = table.get(index + 1) {
            if tier.threshold > 0 && next.status_points >= tier.threshold {
                index += 1;
            } else {
                break;
            }
        }

        let kind = if index > previous {
            next.tier_index = index;
            next.miss_streak = 0;
            debug!(
                from = previous,
                to = index,
                status_points = next.status_points,
                "tier promoted"
            );
            TransitionKind::Promoted
        } else if table.tier(previous).misses_retention(month_points) {
            next.miss_streak = self.miss_streak.saturating_add(1);
            if next.miss_streak >= DEMOTION_MISS_LIMIT && previous > 0 {
                let lower = previous - 1;
                next.tier_index = lower;
                next.miss_streak = 0;
                next.status_points = next.status_points.min(table.tier(lower).threshold);
                debug!(
                    from = previous,
                    to = lower,
                    status_points = next.status_points,
                    "tier demoted"
                );
                TransitionKind::Demoted
            } else {
                TransitionKind::Missed
            }
        } else {
            next.miss_streak = 0;
            TransitionKind::Retained
        };

        let transition = Transition {
            kind,
            previous,
            current: next.tier_index,
            unclamped_status,
        };
        (next, transition)
    }

    /// Fold a sequence of monthly point totals from a fresh state.
    pub fn replay(
        table: &TierTable,
        month_points: impl IntoIterator<Item = u64>,
    ) -> Vec<(Self, Transition)> {
        month_points
            .into_iter()
            .scan(Self::new(), |state, points| {
                let (next, transition) = state.advance(table, points);
                *state = next;
                Some((next, transition))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mira_core::types::Tier;
    use proptest::prelude::*;

    /// Thresholds 0 / 100 / 1,000 / 5,000; floors 20 / 200 / 1,000.
    fn small_table() -> TierTable {
        TierTable::new(vec![
            Tier::coin("entry", 0, 0),
            Tier::coin("one", 100, 500),
            Tier::coin("two", 1_000, 1_000),
            Tier::cash("three", 5_000, 3_000),
        ])
        .unwrap()
    }

    fn at(tier_index: usize, miss_streak: u32, status_points: u64) -> ProgressionState {
        ProgressionState {
            tier_index,
            miss_streak,
            status_points,
            cumulative_points: status_points,
        }
    }

    #[test]
    fn fresh_state_is_entry_tier() {
        let s = ProgressionState::new();
        assert_eq!(s.tier_index, 0);
        assert_eq!(s.miss_streak, 0);
        assert_eq!(s.status_points, 0);
    }

    #[test]
    fn entry_tier_never_misses() {
        let table = small_table();
        let (s, t) = ProgressionState::new().advance(&table, 0);
        assert_eq!(t.kind, TransitionKind::Retained);
        assert_eq!(s.tier_index, 0);
        assert_eq!(s.miss_streak, 0);
    }

    #[test]
    fn promotes_through_several_tiers() {
        let table = small_table();
        let (s, t) = ProgressionState::new().advance(&table, 1_500);
        assert_eq!(t.kind, TransitionKind::Promoted);
        assert_eq!((t.previous, t.current), (0, 2));
        assert_eq!(s.tier_index, 2);
    }

    #[test]
    fn promotes_exactly_at_threshold() {
        let table = small_table();
        let (s, _) = ProgressionState::new().advance(&table, 99);
        assert_eq!(s.tier_index, 0);
        let (s, t) = s.advance(&table, 1);
        assert_eq!(t.kind, TransitionKind::Promoted);
        assert_eq!(s.tier_index, 1);
    }

    #[test]
    fn promotion_beats_demotion() {
        let table = small_table();
        // At "two" with one miss already; 1 point is under the 200 floor
        // but lifts status to the "three" threshold.
        let (s, t) = at(2, 1, 4_999).advance(&table, 1);
        assert_eq!(t.kind, TransitionKind::Promoted);
        assert_eq!(s.tier_index, 3);
        assert_eq!(s.miss_streak, 0);
    }

    #[test]
    fn single_miss_does_not_demote() {
        let table = small_table();
        let (s, t) = at(2, 0, 1_000).advance(&table, 199);
        assert_eq!(t.kind, TransitionKind::Missed);
        assert_eq!(s.tier_index, 2);
        assert_eq!(s.miss_streak, 1);
    }

    #[test]
    fn two_consecutive_misses_demote_and_clamp() {
        let table = small_table();
        let (s, _) = at(2, 0, 1_000).advance(&table, 100);
        let (s, t) = s.advance(&table, 100);
        assert_eq!(t.kind, TransitionKind::Demoted);
        assert_eq!((t.previous, t.current), (2, 1));
        assert_eq!(t.unclamped_status, 1_200);
        assert_eq!(s.tier_index, 1);
        assert_eq!(s.miss_streak, 0);
        assert_eq!(s.status_points, 100);
        assert_eq!(s.cumulative_points, 1_200);
    }

    #[test]
    fn qualifying_month_resets_streak() {
        let table = small_table();
        let (s, _) = at(2, 0, 1_000).advance(&table, 100);
        assert_eq!(s.miss_streak, 1);
        let (s, t) = s.advance(&table, 200);
        assert_eq!(t.kind, TransitionKind::Retained);
        assert_eq!(s.miss_streak, 0);
        let (s, t) = s.advance(&table, 100);
        assert_eq!(t.kind, TransitionKind::Missed);
        assert_eq!(s.tier_index, 2);
    }

    #[test]
    fn promotion_after_demotion_uses_clamped_points() {
        let table = small_table();
        let (s, _) = at(2, 0, 1_000).advance(&table, 100);
        let (s, _) = s.advance(&table, 100);
        assert_eq!(s.status_points, 100);
        // Unclamped status would be 1,700 and re-promote; clamped is 600.
        let (s, t) = s.advance(&table, 500);
        assert_eq!(t.kind, TransitionKind::Retained);
        assert_eq!(s.tier_index, 1);
        assert_eq!(s.status_points, 600);
        let (s, t) = s.advance(&table, 400);
        assert_eq!(t.kind, TransitionKind::Promoted);
        assert_eq!(s.tier_index, 2);
    }

    #[test]
    fn demotes_one_tier_at_a_time() {
        let table = small_table();
        let steps = ProgressionState::replay(&table, [5_000, 0, 0, 0, 0, 0, 0]);
        let tiers: Vec<usize> = steps.iter().map(|(s, _)| s.tier_index).collect();
        assert_eq!(tiers, vec![3, 3, 2, 2, 1, 1, 0]);
        let (last, _) = steps.last().unwrap();
        assert_eq!(last.status_points, 0);
        assert_eq!(last.cumulative_points, 5_000);
    }

    #[test]
    fn entry_tier_stops_demotion() {
        let table = small_table();
        let steps = ProgressionState::replay(&table, [100, 0, 0, 0, 0]);
        let (last, t) = steps.last().unwrap();
        assert_eq!(last.tier_index, 0);
        assert_eq!(t.kind, TransitionKind::Retained);
    }

    #[test]
    fn default_table_sample_months() {
        let table = TierTable::default();
        let steps = ProgressionState::replay(&table, [2_000_000, 30_000_000, 50_000_000]);
        let names: Vec<&str> = steps
            .iter()
            .map(|(s, _)| table.tier(s.tier_index).name.as_str())
            .collect();
        assert_eq!(names, vec!["米拉三星", "米拉六星", "米拉合伙人"]);
        assert_eq!(steps[1].0.cumulative_points, 32_000_000);
    }

    #[test]
    fn replay_is_deterministic() {
        let table = small_table();
        let points = [120, 0, 900, 3, 4_000, 0, 0, 10];
        assert_eq!(
            ProgressionState::replay(&table, points),
            ProgressionState::replay(&table, points)
        );
    }

    proptest! {
        #[test]
        fn status_stays_within_tier_band(points in proptest::collection::vec(0u64..3_000, 1..40)) {
            let table = small_table();
            for (s, _) in ProgressionState::replay(&table, points) {
                let tier = table.tier(s.tier_index);
                prop_assert!(s.status_points >= tier.threshold);
                if let Some(next) = table.get(s.tier_index + 1) {
                    prop_assert!(s.status_points < next.threshold);
                }
                prop_assert!(s.status_points <= s.cumulative_points);
                prop_assert!(s.miss_streak < DEMOTION_MISS_LIMIT);
            }
        }

        #[test]
        fn tier_only_falls_by_demotion(points in proptest::collection::vec(0u64..3_000, 1..40)) {
            let table = small_table();
            for (_, t) in ProgressionState::replay(&table, points) {
                match t.kind {
                    TransitionKind::Demoted => prop_assert_eq!(t.current + 1, t.previous),
                    TransitionKind::Promoted => prop_assert!(t.current > t.previous),
                    _ => prop_assert_eq!(t.current, t.previous),
                }
            }
        }

        #[test]
        fn large_months_never_demote(points in proptest::collection::vec(1_000u64..10_000, 1..40)) {
            // Every month clears the highest floor (1,000), so the tier is non-decreasing.
            let table = small_table();
            let mut last = 0;
            for (s, t) in ProgressionState::replay(&table, points) {
                prop_assert!(t.kind != TransitionKind::Demoted);
                prop_assert!(s.tier_index >= last);
                last = s.tier_index;
            }
        }
    }
}
