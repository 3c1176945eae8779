//! Integration test suite for the Mira simulator.
//!
//! Drives the engine end to end from scenario files and checks the
//! progression and settlement invariants across whole simulations.

pub mod helpers;
