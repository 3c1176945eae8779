//! CLI configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mira_core::amount::parse_percent;
use mira_core::scenario::Scenario;
use mira_core::types::SimulationParams;

/// Scenario file looked up when no path is given.
pub fn default_scenario_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mira").join("scenario.json"))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Upline share ratio in basis points (`MIRA_UPLINE_SHARE`, percent).
    pub upline_share_bps: Option<u64>,
    /// Settlement ratio in basis points (`MIRA_SETTLEMENT_RATIO`, percent).
    pub settlement_ratio_bps: Option<u64>,
    /// Scenario file (`MIRA_SCENARIO`).
    pub scenario_path: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            upline_share_bps: get("MIRA_UPLINE_SHARE").map(|v| parse_percent(&v)),
            settlement_ratio_bps: get("MIRA_SETTLEMENT_RATIO").map(|v| parse_percent(&v)),
            scenario_path: get("MIRA_SCENARIO").map(PathBuf::from),
        }
    }

    /// Default parameters with the environment applied.
    pub fn base_params(&self) -> SimulationParams {
        let defaults = SimulationParams::default();
        SimulationParams {
            settlement_ratio_bps: self
                .settlement_ratio_bps
                .unwrap_or(defaults.settlement_ratio_bps),
            upline_share_bps: self.upline_share_bps.unwrap_or(defaults.upline_share_bps),
            upstream_share_bps: 0,
        }
    }

    /// Load the scenario: `explicit` path, then `MIRA_SCENARIO`, then the
    /// default path if it exists, then the built-in sample.
    pub fn load_scenario(&self, explicit: Option<PathBuf>) -> Result<Scenario> {
        let path = explicit.or_else(|| self.scenario_path.clone()).or_else(|| {
            default_scenario_path().filter(|p| p.is_file())
        });
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading scenario");
                Scenario::load(&path)
                    .with_context(|| format!("failed to load scenario {}", path.display()))
            }
            None => {
                tracing::debug!("no scenario file, using the built-in sample");
                Ok(Scenario::sample())
            }
        }
    }
}
