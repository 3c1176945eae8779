//! Trait interfaces between crates.
//!
//! - [`SettlementCalculator`] — reward math for one month (mira-engine implements)

use crate::types::{MonthInput, Settlement, SimulationParams, Tier};

/// Pure conversion of a month's recharges into rewards for a resolved tier.
///
/// All amounts are integer fen (or COIN hundredths) and all ratios are
/// basis points. Implementations must clamp ratios into `[0, 100]%` before
/// use and must never mix reward kinds: every reward of a month is paid in
/// the kind of the tier it was settled at.
pub trait SettlementCalculator: Send + Sync {
    /// Settle one month at `tier` under `params`.
    fn settle(&self, month: &MonthInput, tier: &Tier, params: &SimulationParams) -> Settlement;

    /// `(coin_reward, cash_reward)` for the month.
    ///
    /// Default implementation delegates to [`settle`](Self::settle).
    fn rewards(&self, month: &MonthInput, tier: &Tier, params: &SimulationParams) -> (u64, u64) {
        let s = self.settle(month, tier, params);
        (s.coin_reward, s.cash_reward)
    }
}
