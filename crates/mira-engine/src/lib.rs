//! # mira-engine — Tier progression and settlement engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Progression**: a per-month state machine promotes as soon as status
//!   points reach a higher threshold and demotes after two consecutive months
//!   under 20% of the current tier's threshold, clamping status points to the
//!   lower tier's threshold.
//! - **Settlement**: own and team recharges settle at the resolved tier's
//!   rate, with the upline share of the team settlement credited to self and
//!   an optional upstream share forwarded from own rewards.
//! - **Simulation**: a left fold over the month list, run once for the
//!   account and once for its simulated downline.
//! - **Memoization**: the last two-pass report is cached by input digest.

pub mod memo;
pub mod progression;
pub mod settlement;
pub mod simulation;
pub mod summary;
pub mod trace;

pub use memo::MemoizedSimulator;
pub use progression::{ProgressionState, Transition, TransitionKind};
pub use settlement::SettlementEngine;
pub use simulation::{simulate, simulate_two_pass, Simulator, TwoPassReport};
pub use summary::SimulationSummary;
