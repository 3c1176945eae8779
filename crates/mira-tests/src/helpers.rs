//! Shared test helpers for integration tests.

use mira_core::tiers::TierTable;
use mira_core::types::{MonthInput, MonthResult, Tier};

/// A month with recharges given in yuan, labelled by position.
pub fn month(self_yuan: u64, downline_yuan: u64) -> MonthInput {
    MonthInput::from_yuan("m", self_yuan, downline_yuan)
}

/// Months from `(self, downline)` yuan pairs.
pub fn months(pairs: &[(u64, u64)]) -> Vec<MonthInput> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, &(s, d))| MonthInput::from_yuan(format!("m{}", i + 1), s, d))
        .collect()
}

/// The three-month growth example: ¥10k/10k, ¥100k/200k, ¥200k/300k.
pub fn sample_months() -> Vec<MonthInput> {
    months(&[(10_000, 10_000), (100_000, 200_000), (200_000, 300_000)])
}

/// Four tiers with small thresholds (0 / 100 / 1,000 / 5,000 points).
pub fn small_table() -> TierTable {
    TierTable::new(vec![
        Tier::coin("entry", 0, 0),
        Tier::coin("one", 100, 500),
        Tier::coin("two", 1_000, 1_000),
        Tier::cash("three", 5_000, 3_000),
    ])
    .unwrap()
}

/// Tier names in month order.
pub fn tier_names(results: &[MonthResult]) -> Vec<&str> {
    results.iter().map(|r| r.tier.name.as_str()).collect()
}

/// A month earning exactly `points` from own recharge (1 fen = 1 point).
pub fn points_month(points: u64) -> MonthInput {
    MonthInput {
        label: "m".to_string(),
        self_recharge: points,
        ..MonthInput::default()
    }
}
