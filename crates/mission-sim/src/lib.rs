//! Mission Sim - randomised invariant checking for the mission lifecycle
//!
//! Drives [`mission_core::MissionLifecycle`] with generated requests against
//! in-memory collaborators and reports every broken invariant.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod simulator;

pub use simulator::{run_simulator, SimulatorConfig, SimulatorReport, SimulatorStats, Violation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
