//! # mira-core
//! Foundation types and traits for the Mira partner program.

pub mod amount;
pub mod constants;
pub mod error;
pub mod format;
pub mod scenario;
pub mod tiers;
pub mod traits;
pub mod types;
