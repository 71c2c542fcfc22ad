//! Shared type definitions for the Whispers simulation.
//!
//! This crate is the single source of truth for the data that flows between
//! the agent, world, and orchestration crates, and out to the metrics,
//! snapshot, and display collaborators. Record types consumed by display
//! tooling derive `ts-rs` bindings.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for agent identifiers
//! - [`enums`] -- The [`Profile`] personality archetypes
//! - [`history`] -- [`BoundedWindow`], the drop-oldest sliding window
//! - [`structs`] -- Agent state, resources, records, and snapshots

pub mod enums;
pub mod history;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::Profile;
pub use history::BoundedWindow;
pub use ids::AgentId;
pub use structs::{
    AgentMarker, AgentRecord, AgentState, DayRecord, GridView, Position, Resource, RngState,
    SimulationSnapshot, SnapshotMetadata, StrategyTraits, COOPERATION_WINDOW, HARVEST_WINDOW,
    INITIAL_REPUTATION,
};

#[cfg(test)]
mod tests {
    //! Binding generation for display tooling.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::enums::Profile::export_all();
        let _ = crate::structs::AgentRecord::export_all();
        let _ = crate::structs::DayRecord::export_all();
        let _ = crate::structs::GridView::export_all();
    }
}
