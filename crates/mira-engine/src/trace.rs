//! Human-readable calculation traces.
//!
//! One list of formula lines per logical step: points accrual, tier
//! judgment, COIN rebate and CASH share. Point counts use integer grouping;
//! currency, COIN and percentages show two decimals unless whole.

use mira_core::constants::{
    CERTIFICATION_BONUS_MIRA, DEMOTION_MISS_LIMIT, LEVEL50_BONUS_MIRA, LIVESTREAM_MIRA_PER_HOUR,
    RECHARGE_TO_MIRA, REGISTRATION_BONUS_MIRA,
};
use mira_core::format::{
    format_coin, format_currency, format_hundredths, format_percent, format_points,
};
use mira_core::tiers::TierTable;
use mira_core::types::{CalculationTrace, MonthInput, RewardKind, Settlement, SimulationParams};

use crate::progression::{ProgressionState, Transition, TransitionKind};

/// Everything one month's trace is derived from.
pub struct TraceContext<'a> {
    pub table: &'a TierTable,
    pub month: &'a MonthInput,
    pub before: &'a ProgressionState,
    pub after: &'a ProgressionState,
    pub transition: &'a Transition,
    pub settlement: &'a Settlement,
    /// Already clamped.
    pub params: &'a SimulationParams,
}

impl TraceContext<'_> {
    pub fn build(&self) -> CalculationTrace {
        CalculationTrace {
            mira: self.mira_lines(),
            tier: self.tier_lines(),
            coin: self.reward_lines(RewardKind::Coin),
            cash: self.reward_lines(RewardKind::Cash),
        }
    }

    fn month_points(&self) -> u64 {
        self.month.month_points()
    }

    fn mira_lines(&self) -> Vec<String> {
        let m = self.month;
        let rate = format_points(RECHARGE_TO_MIRA);
        let mut lines = vec![
            format!(
                "本人充值 {} × {rate} = {} 米拉",
                format_currency(m.self_recharge),
                format_points(m.self_points())
            ),
            format!(
                "团队充值 {} × {rate} = {} 米拉",
                format_currency(m.downline_recharge),
                format_points(m.team_points())
            ),
        ];

        let b = &m.bonus;
        let mut parts = vec![format_points(m.self_points()), format_points(m.team_points())];
        let bonus = [
            ("注册奖励", b.registrations, "人", REGISTRATION_BONUS_MIRA, b.registration_points()),
            ("50 级奖励", b.level50_invitees, "人", LEVEL50_BONUS_MIRA, b.level50_points()),
            ("直播奖励", b.livestream_hours, "h", LIVESTREAM_MIRA_PER_HOUR, b.livestream_points()),
            ("认证奖励", b.certifications, "次", CERTIFICATION_BONUS_MIRA, b.certification_points()),
        ];
        for (title, count, unit, each, points) in bonus {
            if count == 0 {
                continue;
            }
            lines.push(format!(
                "{title}：{} {unit} × {} = {} 米拉",
                format_points(count),
                format_points(each),
                format_points(points)
            ));
            parts.push(format_points(points));
        }

        lines.push(format!(
            "当月新增米拉 = {} = {} 米拉",
            parts.join(" + "),
            format_points(self.month_points())
        ));
        lines.push(format!(
            "累计米拉 = {} + {} = {} 米拉",
            format_points(self.before.cumulative_points),
            format_points(self.month_points()),
            format_points(self.after.cumulative_points)
        ));
        lines
    }

    fn tier_lines(&self) -> Vec<String> {
        let t = self.transition;
        let previous = self.table.tier(t.previous);
        let current = self.table.tier(t.current);
        let month = format_points(self.month_points());

        let mut lines = vec![format!(
            "保级米拉 = {} + {month} = {} 米拉",
            format_points(self.before.status_points),
            format_points(t.unclamped_status)
        )];

        match t.kind {
            TransitionKind::Promoted => lines.push(format!(
                "保级米拉 {} 达到「{}」{} 阈值，由「{}」晋升至「{}」",
                format_points(t.unclamped_status),
                current.name,
                format_points(current.threshold),
                previous.name,
                current.name
            )),
            TransitionKind::Demoted => {
                lines.push(format!(
                    "当月新增 {month} < {} 米拉（「{}」阈值 {} × 20%），连续 {DEMOTION_MISS_LIMIT} 个月未达保级",
                    format_points(previous.retention_floor()),
                    previous.name,
                    format_points(previous.threshold)
                ));
                lines.push(format!(
                    "由「{}」降级至「{}」，保级米拉封顶为 {} 阈值：{} → {}",
                    previous.name,
                    current.name,
                    format_points(current.threshold),
                    format_points(t.unclamped_status),
                    format_points(self.after.status_points)
                ));
            }
            TransitionKind::Missed => lines.push(format!(
                "当月新增 {month} < {} 米拉（「{}」阈值 {} × 20%），未达保级，连续未达 {} 个月",
                format_points(current.retention_floor()),
                current.name,
                format_points(current.threshold),
                self.after.miss_streak
            )),
            TransitionKind::Retained if current.threshold > 0 => lines.push(format!(
                "当月新增 {month} ≥ {} 米拉（「{}」阈值 {} × 20%），保级成功",
                format_points(current.retention_floor()),
                current.name,
                format_points(current.threshold)
            )),
            TransitionKind::Retained => {}
        }

        let progress = self
            .table
            .progress_from(self.after.tier_index, self.after.status_points);
        match progress.next {
            Some(next) => lines.push(format!(
                "星级定位为「{}」，距「{}」{} 阈值还差 {} 米拉",
                current.name,
                next.name,
                format_points(self.table.tier(next.index).threshold),
                format_points(progress.remaining)
            )),
            None => lines.push(format!("星级定位为「{}」，已达最高星级", current.name)),
        }
        lines
    }

    fn reward_lines(&self, kind: RewardKind) -> Vec<String> {
        let s = self.settlement;
        let p = self.params;
        let m = self.month;
        let with_unit = |v: u64| match kind {
            RewardKind::Coin => format_coin(v),
            RewardKind::Cash => format_currency(v),
        };
        let plain = |v: u64| match kind {
            RewardKind::Coin => format_hundredths(v),
            RewardKind::Cash => format_currency(v),
        };

        let mut lines = Vec::new();
        let mut parts = Vec::new();
        if s.kind == kind && s.rate_bps > 0 {
            if m.self_recharge > 0 {
                lines.push(format!(
                    "本人结算：{} × {} × {} = {}",
                    format_currency(m.self_recharge),
                    format_percent(p.settlement_ratio_bps),
                    format_percent(s.rate_bps),
                    with_unit(s.raw_self_reward)
                ));
                if p.upstream_share_bps > 0 {
                    lines.push(format!(
                        "上级抽成：{} × {} = {}，本人保留 {}",
                        plain(s.raw_self_reward),
                        format_percent(p.upstream_share_bps),
                        plain(s.forwarded),
                        with_unit(s.self_reward)
                    ));
                }
                parts.push(with_unit(s.self_reward));
            }
            if m.downline_recharge > 0 {
                lines.push(format!(
                    "团队结算：{} × {} × {} = {}",
                    format_currency(m.downline_recharge),
                    format_percent(p.settlement_ratio_bps),
                    format_percent(s.rate_bps),
                    plain(s.downline_settlement)
                ));
                lines.push(format!(
                    "上级分配：{} × {} = {}",
                    plain(s.downline_settlement),
                    format_percent(p.upline_share_bps),
                    plain(s.upline_share)
                ));
                parts.push(with_unit(s.upline_share));
            }
        }

        let (title, total) = match kind {
            RewardKind::Coin => ("当月 COIN 返利", s.coin_reward),
            RewardKind::Cash => ("当月现金分成", s.cash_reward),
        };
        if parts.is_empty() {
            lines.push(format!("{title} = {}", with_unit(0)));
        } else {
            lines.push(format!("{title} = {} = {}", parts.join(" + "), with_unit(total)));
        }
        lines
    }
}
