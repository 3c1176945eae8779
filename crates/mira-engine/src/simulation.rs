//! Month-by-month simulation driver.
//!
//! A simulation is a left fold of [`ProgressionState`] over the month list:
//! each step advances the tier, settles the month at the tier reached, and
//! records a fully derived [`MonthResult`]. Nothing is stored between runs,
//! so the same inputs always reproduce the same results.
//!
//! The two-pass report runs the fold twice: once for the account itself
//! (team recharges earn it the upline share) and once for the simulated
//! downline (which recharges the team amount and forwards the upline share
//! of its own settlement).

use mira_core::amount::ratio_bps;
use mira_core::tiers::TierTable;
use mira_core::traits::SettlementCalculator;
use mira_core::types::{Assumptions, MonthInput, MonthResult, SimulationParams, TierChange};
use serde::Serialize;
use tracing::{debug, trace};

use crate::progression::{ProgressionState, TransitionKind};
use crate::settlement::SettlementEngine;
use crate::summary::SimulationSummary;
use crate::trace::TraceContext;

/// Both passes of a simulation with their summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwoPassReport {
    /// Top-level parameters; the downline pass derives its own.
    pub params: SimulationParams,
    pub self_pass: Vec<MonthResult>,
    pub downline_pass: Vec<MonthResult>,
    pub self_summary: SimulationSummary,
    pub downline_summary: SimulationSummary,
}

/// Runs simulations with a pluggable settlement calculator.
#[derive(Debug, Clone, Default)]
pub struct Simulator<C = SettlementEngine> {
    calculator: C,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: SettlementCalculator> Simulator<C> {
    pub fn with_calculator(calculator: C) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    /// Apply one month to `state` and derive its result.
    pub fn step(
        &self,
        table: &TierTable,
        state: ProgressionState,
        month: &MonthInput,
        params: &SimulationParams,
    ) -> (ProgressionState, MonthResult) {
        let params = params.clamped();
        let month_points = month.month_points();
        let (next, transition) = state.advance(table, month_points);
        let tier = table.tier(next.tier_index).clone();
        let settlement = self.calculator.settle(month, &tier, &params);

        let calculations = TraceContext {
            table,
            month,
            before: &state,
            after: &next,
            transition: &transition,
            settlement: &settlement,
            params: &params,
        }
        .build();

        let tier_change = TierChange {
            previous: table.tier_ref(transition.previous),
            current: table.tier_ref(transition.current),
            promotion: (transition.kind == TransitionKind::Promoted)
                .then(|| table.tier_ref(transition.current)),
            degraded: (transition.kind == TransitionKind::Demoted)
                .then(|| table.tier_ref(transition.current)),
            miss_streak: next.miss_streak,
        };

        trace!(
            month = %month.label,
            tier = %tier.name,
            month_points,
            status_points = next.status_points,
            coin = settlement.coin_reward,
            cash = settlement.cash_reward,
            "month settled"
        );

        let result = MonthResult {
            month: month.clone(),
            month_points,
            cumulative_points: next.cumulative_points,
            status_points: next.status_points,
            tier_change,
            coin_reward: settlement.coin_reward,
            cash_reward: settlement.cash_reward,
            coin_return_bps: ratio_bps(settlement.coin_reward, month.self_recharge),
            cash_return_bps: ratio_bps(settlement.cash_reward, month.self_recharge),
            retention_shortfall: table.retention_shortfall(next.tier_index, month_points),
            progress: table.progress_from(next.tier_index, next.status_points),
            assumptions: Assumptions {
                downline_rate_kind: tier.kind,
                downline_rate_bps: settlement.rate_bps,
                settlement_ratio_bps: params.settlement_ratio_bps,
                upline_share_bps: params.upline_share_bps,
                upstream_share_bps: params.upstream_share_bps,
            },
            settlement,
            tier,
            calculations,
        };
        (next, result)
    }

    /// Fold `months` from a fresh state. An empty list yields no results.
    pub fn simulate(
        &self,
        table: &TierTable,
        months: &[MonthInput],
        params: &SimulationParams,
    ) -> Vec<MonthResult> {
        months
            .iter()
            .scan(ProgressionState::new(), |state, month| {
                let (next, result) = self.step(table, *state, month, params);
                *state = next;
                Some(result)
            })
            .collect()
    }

    /// Simulate the account and its downline.
    ///
    /// `params.upstream_share_bps` is ignored: the account is top-level.
    pub fn two_pass(
        &self,
        table: &TierTable,
        months: &[MonthInput],
        params: &SimulationParams,
    ) -> TwoPassReport {
        let params = SimulationParams {
            upstream_share_bps: 0,
            ..params.clamped()
        };
        debug!(
            months = months.len(),
            upline_share_bps = params.upline_share_bps,
            "running two-pass simulation"
        );

        let self_pass = self.simulate(table, months, &params);
        let downline_months: Vec<MonthInput> = months.iter().map(MonthInput::as_downline).collect();
        let downline_pass = self.simulate(table, &downline_months, &params.downline_of());

        TwoPassReport {
            params,
            self_summary: SimulationSummary::from_results(&self_pass),
            downline_summary: SimulationSummary::from_results(&downline_pass),
            self_pass,
            downline_pass,
        }
    }
}

/// Single pass with the default settlement engine.
pub fn simulate(
    table: &TierTable,
    months: &[MonthInput],
    params: &SimulationParams,
) -> Vec<MonthResult> {
    Simulator::new().simulate(table, months, params)
}

/// Both passes with the default settlement engine.
pub fn simulate_two_pass(
    table: &TierTable,
    months: &[MonthInput],
    params: &SimulationParams,
) -> TwoPassReport {
    Simulator::new().two_pass(table, months, params)
}
