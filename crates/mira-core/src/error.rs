//! Error types for the Mira partner program.
//!
//! The settlement engine itself is total; errors only arise when a tier
//! table is built or a scenario is loaded.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TierTableError {
    #[error("tier table is empty")] Empty,
    #[error("entry tier threshold must be 0, got {0}")] EntryThresholdNotZero(u64),
    #[error("threshold of tier {index} ({threshold}) is not above the previous tier ({previous})")] ThresholdsNotIncreasing { index: usize, threshold: u64, previous: u64 },
    #[error("rate of tier {index} out of range: {bps} bps")] RateOutOfRange { index: usize, bps: u64 },
    #[error("tier {index} pays {kind} but carries a non-zero rate of the other kind")] RateKindMismatch { index: usize, kind: String },
    #[error("unknown tier: {0}")] UnknownTier(String),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("io: {0}")] Io(#[from] std::io::Error),
    #[error("json: {0}")] Json(#[from] serde_json::Error),
    #[error("invalid start month (expected YYYY-MM): {0}")] InvalidStartMonth(String),
    #[error(transparent)] TierTable(#[from] TierTableError),
}
