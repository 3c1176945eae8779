//! Plain-text rendering of reports, tier tables and progress.

use mira_core::format::{format_coin, format_currency, format_percent, format_points};
use mira_core::tiers::TierTable;
use mira_core::types::{MonthResult, TierProgress};
use mira_engine::{SimulationSummary, TwoPassReport};

fn badge(r: &MonthResult) -> String {
    if r.promoted() {
        " [晋升]".to_string()
    } else if r.degraded() {
        " [降级]".to_string()
    } else if r.tier_change.miss_streak > 0 {
        format!(" [未达保级 {}]", r.tier_change.miss_streak)
    } else {
        String::new()
    }
}

fn account_line(role: &str, r: &MonthResult) -> String {
    format!(
        "{role}：{}{}，COIN {}，现金 {}，返利率 {} / {}",
        r.tier.name,
        badge(r),
        format_coin(r.coin_reward),
        format_currency(r.cash_reward),
        format_percent(r.coin_return_bps),
        format_percent(r.cash_return_bps)
    )
}

fn trace_lines(role: &str, r: &MonthResult) -> Vec<String> {
    let c = &r.calculations;
    let mut lines = Vec::new();
    for (title, steps) in [
        ("米拉计算", &c.mira),
        ("星级判定", &c.tier),
        ("COIN 返利", &c.coin),
        ("现金分成", &c.cash),
    ] {
        lines.push(format!("  {role} · {title}"));
        lines.extend(steps.iter().map(|s| format!("    {s}")));
    }
    lines
}

fn summary_line(role: &str, s: &SimulationSummary) -> String {
    let tier = s
        .final_tier
        .as_ref()
        .map_or_else(|| "-".to_string(), |t| t.name.clone());
    format!(
        "合计（{role}）：充值 {}，米拉 {}，COIN {}，现金 {}，最终星级 {tier}，晋升 {} 次，降级 {} 次",
        format_currency(s.total_self_recharge),
        format_points(s.total_points),
        format_coin(s.total_coin),
        format_currency(s.total_cash),
        s.promotions,
        s.demotions
    )
}

/// Month-by-month timeline for both passes, then totals.
pub fn render_report(report: &TwoPassReport, with_trace: bool) -> String {
    let mut lines = vec![format!(
        "结算比例 {}，上级分配比例 {} / 本人 {}",
        format_percent(report.params.settlement_ratio_bps),
        format_percent(report.params.upline_share_bps),
        format_percent(report.params.self_share_bps())
    )];

    for (own, team) in report.self_pass.iter().zip(&report.downline_pass) {
        lines.push(String::new());
        lines.push(format!("── {} ──", own.month.label));
        lines.push(format!(
            "充值：本人 {} / 团队 {}，新增 {} 米拉，累计 {} 米拉",
            format_currency(own.month.self_recharge),
            format_currency(own.month.downline_recharge),
            format_points(own.month_points),
            format_points(own.cumulative_points)
        ));
        lines.push(account_line("本人", own));
        lines.push(account_line("下级", team));
        if with_trace {
            lines.extend(trace_lines("本人", own));
            lines.extend(trace_lines("下级", team));
        }
    }

    lines.push(String::new());
    lines.push(summary_line("本人", &report.self_summary));
    lines.push(summary_line("下级", &report.downline_summary));
    lines.join("\n")
}

pub fn render_tiers(table: &TierTable) -> String {
    let mut lines = vec![format!(
        "{:<3} {:<8} {:>15}  {:<4} {:>6}",
        "#", "星级", "阈值", "类型", "比例"
    )];
    for (i, tier) in table.iter().enumerate() {
        lines.push(format!(
            "{:<3} {:<8} {:>15}  {:<4} {:>6}",
            i,
            tier.name,
            format_points(tier.threshold),
            tier.kind.to_string(),
            format_percent(tier.rate_bps())
        ));
    }
    lines.join("\n")
}

pub fn render_progress(progress: &TierProgress, points: u64, shortfall: Option<u64>) -> String {
    let mut lines = vec![format!(
        "当前星级：{}（{} 米拉）",
        progress.current.name,
        format_points(points)
    )];
    match &progress.next {
        Some(next) => lines.push(format!(
            "距「{}」还差 {} 米拉，进度 {}%",
            next.name,
            format_points(progress.remaining),
            progress.percent
        )),
        None => lines.push("已达最高星级".to_string()),
    }
    if let Some(shortfall) = shortfall {
        if shortfall == 0 {
            lines.push("本月已达保级".to_string());
        } else {
            lines.push(format!("本月还需 {} 米拉保级", format_points(shortfall)));
        }
    }
    lines.join("\n")
}
