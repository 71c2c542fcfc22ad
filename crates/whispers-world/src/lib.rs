//! The spatial field for the Whispers simulation.
//!
//! This crate models the grid agents forage on: a bounded set of cells
//! holding the day's resource units, nearest-resource lookup by Manhattan
//! distance, and the occasional big shared resource that agents negotiate
//! over.
//!
//! # Modules
//!
//! - [`environment`] -- The resource grid ([`Environment`]): spawning,
//!   closest-resource lookup, and idempotent collection.
//! - [`big_resource`] -- Daily big-resource chance and partner pairing
//!   ([`BigResourcePhase`]).
//! - [`error`] -- Construction errors ([`WorldError`]).

pub mod big_resource;
pub mod environment;
pub mod error;

// Re-export primary types at crate root.
pub use big_resource::BigResourcePhase;
pub use environment::{DEFAULT_MIN_RESOURCES, Environment, RESOURCE_VALUE};
pub use error::WorldError;
