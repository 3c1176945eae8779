//! Scenario files: the user-editable parameter set, read leniently from JSON.
//!
//! ```json
//! {
//!   "start_month": "2024-03",
//!   "upline_share": 20,
//!   "rates": { "米拉三星": 12.5, "7": "30" },
//!   "months": [
//!     { "self_recharge": 10000, "downline_recharge": "10000" },
//!     { "self_recharge": 100000, "downline_recharge": 200000,
//!       "bonus": { "registrations": 10, "level50_invitees": 10 } }
//!   ]
//! }
//! ```
//!
//! Amounts are yuan, percentages are 0–100. Every numeric field accepts a
//! number or a string; negative values clamp to 0 and anything non-numeric
//! is 0.

use chrono::{Datelike, Months, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::amount::{LenientAmount, LenientCount, LenientPercent};
use crate::error::ScenarioError;
use crate::tiers::{RateOverride, TierTable};
use crate::types::{BonusActivity, MonthInput, SimulationParams};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioBonus {
    #[serde(default)]
    pub registrations: LenientCount,
    #[serde(default)]
    pub level50_invitees: LenientCount,
    #[serde(default)]
    pub livestream_hours: LenientCount,
    #[serde(default)]
    pub certifications: LenientCount,
}

impl From<&ScenarioBonus> for BonusActivity {
    fn from(b: &ScenarioBonus) -> Self {
        Self {
            registrations: b.registrations.0,
            level50_invitees: b.level50_invitees.0,
            livestream_hours: b.livestream_hours.0,
            certifications: b.certifications.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioMonth {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub self_recharge: LenientAmount,
    #[serde(default)]
    pub downline_recharge: LenientAmount,
    #[serde(default)]
    pub bonus: ScenarioBonus,
}

impl ScenarioMonth {
    pub fn yuan(self_yuan: u64, downline_yuan: u64) -> Self {
        Self {
            self_recharge: LenientAmount(crate::amount::yuan_to_fen(self_yuan)),
            downline_recharge: LenientAmount(crate::amount::yuan_to_fen(downline_yuan)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    /// `YYYY-MM`; when set, months are labelled by calendar month.
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default)]
    pub upline_share: Option<LenientPercent>,
    #[serde(default)]
    pub settlement_ratio: Option<LenientPercent>,
    /// Tier rate overrides keyed by tier name or index.
    #[serde(default)]
    pub rates: BTreeMap<String, LenientPercent>,
    #[serde(default)]
    pub months: Vec<ScenarioMonth>,
}

impl Scenario {
    /// The three-month growth example shipped with the program.
    pub fn sample() -> Self {
        Self {
            months: vec![
                ScenarioMonth::yuan(10_000, 10_000),
                ScenarioMonth::yuan(100_000, 200_000),
                ScenarioMonth::yuan(200_000, 300_000),
            ],
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The parsed start month, pinned to its first day.
    pub fn start_date(&self) -> Result<Option<NaiveDate>, ScenarioError> {
        match &self.start_month {
            None => Ok(None),
            Some(s) => parse_start_month(s).map(Some),
        }
    }

    /// The months as engine inputs, labelled.
    pub fn month_inputs(&self) -> Result<Vec<MonthInput>, ScenarioError> {
        let start = self.start_date()?;
        Ok(self
            .months
            .iter()
            .enumerate()
            .map(|(i, m)| MonthInput {
                label: m.label.clone().unwrap_or_else(|| month_label(i, start)),
                self_recharge: m.self_recharge.0,
                downline_recharge: m.downline_recharge.0,
                bonus: BonusActivity::from(&m.bonus),
            })
            .collect())
    }

    pub fn rate_overrides(&self) -> Vec<RateOverride> {
        self.rates
            .iter()
            .map(|(tier, pct)| RateOverride::new(tier.as_str(), pct.0))
            .collect()
    }

    /// `base` with this scenario's rate overrides applied.
    pub fn tier_table(&self, base: &TierTable) -> Result<TierTable, ScenarioError> {
        Ok(base.with_overrides(&self.rate_overrides())?)
    }

    /// `base` with this scenario's ratios applied, for a top-level account.
    pub fn params(&self, base: SimulationParams) -> SimulationParams {
        SimulationParams {
            settlement_ratio_bps: self
                .settlement_ratio
                .map_or(base.settlement_ratio_bps, |p| p.0),
            upline_share_bps: self.upline_share.map_or(base.upline_share_bps, |p| p.0),
            upstream_share_bps: 0,
        }
        .clamped()
    }
}

/// Parse `YYYY-MM` into the first day of that month.
pub fn parse_start_month(text: &str) -> Result<NaiveDate, ScenarioError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .map_err(|_| ScenarioError::InvalidStartMonth(text.to_string()))
}

/// Label for the month at `index`: `2024年03月` from a start month,
/// otherwise `第一个月`, `第二个月`, ...
pub fn month_label(index: usize, start: Option<NaiveDate>) -> String {
    match start.and_then(|d| d.checked_add_months(Months::new(index as u32))) {
        Some(d) => format!("{}年{:02}月", d.year(), d.month()),
        None => format!("第{}个月", chinese_ordinal(index + 1)),
    }
}

const DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

fn chinese_ordinal(n: usize) -> String {
    match n {
        0..=9 => DIGITS[n].to_string(),
        10 => "十".to_string(),
        11..=19 => format!("十{}", DIGITS[n - 10]),
        20..=99 if n % 10 == 0 => format!("{}十", DIGITS[n / 10]),
        20..=99 => format!("{}十{}", DIGITS[n / 10], DIGITS[n % 10]),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BPS_PRECISION, DEFAULT_UPLINE_SHARE_BPS, SETTLEMENT_RATIO_BPS};
    use std::io::Write;

    #[test]
    fn labels_without_start_month() {
        assert_eq!(month_label(0, None), "第一个月");
        assert_eq!(month_label(9, None), "第十个月");
        assert_eq!(month_label(11, None), "第十二个月");
        assert_eq!(month_label(19, None), "第二十个月");
        assert_eq!(month_label(22, None), "第二十三个月");
        assert_eq!(month_label(120, None), "第121个月");
    }

    #[test]
    fn labels_from_start_month() {
        let start = parse_start_month("2024-03").unwrap();
        assert_eq!(month_label(0, Some(start)), "2024年03月");
        assert_eq!(month_label(2, Some(start)), "2024年05月");
        assert_eq!(month_label(10, Some(start)), "2025年01月");
    }

    #[test]
    fn bad_start_month() {
        assert!(matches!(
            parse_start_month("March"),
            Err(ScenarioError::InvalidStartMonth(_))
        ));
        assert!(parse_start_month("2024-13").is_err());
    }

    #[test]
    fn sample_has_three_months() {
        let months = Scenario::sample().month_inputs().unwrap();
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].label, "第一个月");
        assert_eq!(months[1].self_recharge, 10_000_000);
        assert_eq!(months[2].downline_recharge, 30_000_000);
    }

    #[test]
    fn lenient_json() {
        let s = Scenario::from_json(
            r#"{
                "upline_share": "35",
                "settlement_ratio": 250,
                "rates": { "米拉三星": 0, "7": "33.5" },
                "months": [
                    { "self_recharge": "10000", "downline_recharge": -5 },
                    { "label": "旺季", "self_recharge": "abc", "downline_recharge": null,
                      "bonus": { "livestream_hours": 50, "certifications": "2" } },
                    {}
                ]
            }"#,
        )
        .unwrap();

        let months = s.month_inputs().unwrap();
        assert_eq!(months[0].self_recharge, 1_000_000);
        assert_eq!(months[0].downline_recharge, 0);
        assert_eq!(months[1].label, "旺季");
        assert_eq!(months[1].self_recharge, 0);
        assert_eq!(months[1].bonus.livestream_hours, 50);
        assert_eq!(months[1].bonus.certifications, 2);
        assert_eq!(months[2], MonthInput { label: "第三个月".into(), ..MonthInput::default() });

        let params = s.params(SimulationParams::default());
        assert_eq!(params.upline_share_bps, 3_500);
        assert_eq!(params.settlement_ratio_bps, BPS_PRECISION);
        assert_eq!(params.upstream_share_bps, 0);

        let table = s.tier_table(&TierTable::default()).unwrap();
        assert_eq!(table.tier(3).rate_bps(), 0);
        assert_eq!(table.tier(7).rate_bps(), 3_350);
    }

    #[test]
    fn rate_overrides_snap_to_half_percent() {
        let s = Scenario::from_json(r#"{ "rates": { "7": 33.3, "米拉五星": "18.2" } }"#).unwrap();
        let table = s.tier_table(&TierTable::default()).unwrap();
        assert_eq!(table.tier(7).rate_bps(), 3_350);
        assert_eq!(table.tier(5).rate_bps(), 1_800);
    }

    #[test]
    fn params_default_when_absent() {
        let params = Scenario::sample().params(SimulationParams::default());
        assert_eq!(params.settlement_ratio_bps, SETTLEMENT_RATIO_BPS);
        assert_eq!(params.upline_share_bps, DEFAULT_UPLINE_SHARE_BPS);
    }

    #[test]
    fn unknown_tier_override_is_an_error() {
        let s = Scenario::from_json(r#"{ "rates": { "黄金": 5 } }"#).unwrap();
        assert!(matches!(
            s.tier_table(&TierTable::default()),
            Err(ScenarioError::TierTable(_))
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(Scenario::from_json("{"), Err(ScenarioError::Json(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "start_month": "2024-03", "months": [{{ "self_recharge": 1 }}] }}"#
        )
        .unwrap();
        let s = Scenario::load(file.path()).unwrap();
        let months = s.month_inputs().unwrap();
        assert_eq!(months[0].label, "2024年03月");
        assert_eq!(months[0].self_recharge, 100);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
