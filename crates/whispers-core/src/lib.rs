//! Configuration, day cycle, and orchestration for the Whispers simulation.
//!
//! This crate owns the five-phase day cycle that drives the simulation:
//! start day, forage and negotiate, upkeep, reproduce, and advance.
//!
//! # Modules
//!
//! - [`accounting`] -- Daily resource accounting identities.
//! - [`config`] -- Configuration loading from `whispers-config.yaml` into
//!   strongly-typed structs, with validation.
//! - [`day`] -- The five-phase day cycle ([`DayPhase`]).
//! - [`metrics`] -- In-memory buffer of day records ([`MetricsBuffer`]).
//! - [`simulation`] -- The runner ([`Simulation`]): step, run, views, and
//!   snapshot/restore.
//! - [`snapshot`] -- JSON persistence for snapshots.

pub mod accounting;
pub mod config;
pub mod day;
pub mod metrics;
pub mod simulation;
pub mod snapshot;

// Re-export primary types at crate root.
pub use config::{ConfigError, SimulationConfig};
pub use day::{DayPhase, DaySettings, DayTally};
pub use metrics::{MetricsBuffer, MetricsError, MetricsReport};
pub use simulation::{Simulation, SimulationError};
pub use snapshot::SnapshotError;
