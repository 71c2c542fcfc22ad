//! Core entity structs for the Whispers simulation.
//!
//! - [`AgentState`] -- the full mutable state of one agent
//! - [`Resource`] -- one collectible unit on the grid
//! - [`AgentRecord`] -- the flat, stable-named view of an agent for
//!   metrics and display consumers
//! - [`DayRecord`] -- the per-day metrics record
//! - [`GridView`] -- read-only positions for display consumers
//! - [`SimulationSnapshot`] -- a detached copy of the whole simulation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Profile;
use crate::history::BoundedWindow;
use crate::ids::AgentId;

/// Number of harvest entries an agent remembers.
pub const HARVEST_WINDOW: usize = 10;

/// Number of cooperation outcomes an agent remembers.
pub const COOPERATION_WINDOW: usize = 20;

/// Reputation every agent starts with.
pub const INITIAL_REPUTATION: f64 = 0.5;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer cell on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column, `0..width`.
    pub x: u32,
    /// Row, `0..height`.
    pub y: u32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance `|dx| + |dy|`.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }
}

// ---------------------------------------------------------------------------
// StrategyTraits
// ---------------------------------------------------------------------------

/// The four heritable strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyTraits {
    /// Scales the fair share when sizing a resource request.
    pub request_multiplier: f64,
    /// Base fraction of a shared pool the agent claims.
    pub negotiation_demand: f64,
    /// Minimum own share accepted without a coin flip.
    pub acceptance_threshold: f64,
    /// How strongly the agent leans toward taking more.
    pub greed_index: f64,
}

// ---------------------------------------------------------------------------
// AgentState
// ---------------------------------------------------------------------------

/// Mutable state of a single agent, owned exclusively by that agent.
///
/// `resources_reserve` holds only what was collected today: the day cycle
/// zeroes it every morning. `alive` only ever goes from `true` to `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Opaque unique identifier.
    pub id: AgentId,
    /// Personality archetype.
    pub profile: Profile,
    /// Days lived.
    pub age: u32,
    /// Whether the agent is still participating.
    pub alive: bool,
    /// Resources collected today.
    pub resources_reserve: u32,
    /// Minimum daily intake required to survive upkeep.
    pub daily_need: u32,
    /// Reserve needed before the agent may reproduce.
    pub reproduction_reserve: u32,
    /// Amount deducted from the reserve on a successful birth.
    pub reproduction_cost: u32,
    /// Most recent harvest amounts, oldest first.
    pub harvest_history: BoundedWindow<u32>,
    /// Most recent negotiation outcomes, oldest first.
    pub cooperation_history: BoundedWindow<bool>,
    /// Smoothed cooperation rate in `[0, 1]`.
    pub reputation: f64,
    /// Heritable strategy parameters.
    pub traits: StrategyTraits,
    /// Current grid cell.
    pub position: Position,
    /// True only on the day the agent was born.
    pub newborn: bool,
    /// Zero for seed agents, parent generation + 1 for offspring.
    pub generation: u32,
    /// Parent of an offspring; `None` for seed agents.
    pub parent: Option<AgentId>,
    /// Day index on which the agent was created.
    pub born_on_day: u64,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// One collectible unit on the grid.
///
/// Collection only removes availability: the value stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Cell the resource sits on.
    pub position: Position,
    /// Amount credited on collection (always positive).
    pub value: u32,
    /// Set once, never cleared.
    pub collected: bool,
}

impl Resource {
    /// A fresh, uncollected resource.
    pub const fn new(position: Position, value: u32) -> Self {
        Self {
            position,
            value,
            collected: false,
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Resource({}, {}, value={})",
            self.position.x, self.position.y, self.value
        )
    }
}

// ---------------------------------------------------------------------------
// Records for collaborators
// ---------------------------------------------------------------------------

/// Flat serialization of an agent. Field names are a stable contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentRecord {
    /// Agent identifier.
    pub id: AgentId,
    /// Profile tag.
    pub profile: Profile,
    /// Days lived.
    pub age: u32,
    /// Alive flag.
    pub alive: bool,
    /// Resources collected today.
    pub resources_reserve: u32,
    /// Minimum daily intake.
    pub daily_need: u32,
    /// Smoothed cooperation rate.
    pub reputation: f64,
    /// Request scaling trait.
    pub request_multiplier: f64,
    /// Base negotiation demand trait.
    pub negotiation_demand: f64,
    /// Acceptance threshold trait.
    pub acceptance_threshold: f64,
    /// Greed trait.
    pub greed_index: f64,
    /// Reserve needed to reproduce.
    pub reproduction_reserve: u32,
    /// Cost of reproducing.
    pub reproduction_cost: u32,
    /// Generation number.
    pub generation: u32,
}

/// Metrics emitted once per simulated day.
///
/// Plain owned data: nothing in here refers back into live simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DayRecord {
    /// Day index after the day completed (first day is 1).
    pub day: u64,
    /// Living agents at end of day.
    pub population: u32,
    /// Living cooperative agents.
    pub cooperative: u32,
    /// Living self-interested agents.
    pub self_interested: u32,
    /// Living adaptive agents.
    pub adaptive: u32,
    /// Offspring created today.
    pub births: u32,
    /// Agents that failed upkeep today.
    pub deaths: u32,
    /// Resources placed on the grid this morning.
    pub resources_spawned: u32,
    /// Resources collected by foraging.
    pub resources_collected: u32,
    /// Units handed out by successful negotiations.
    pub resources_negotiated: u32,
    /// Negotiation rounds played.
    pub negotiations_attempted: u32,
    /// Negotiation rounds that ended in a split.
    pub negotiations_succeeded: u32,
    /// Mean reputation of the living population (0 when empty).
    pub average_reputation: f64,
    /// Mean age of the living population (0 when empty).
    pub average_age: f64,
}

/// Display marker for one living agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentMarker {
    /// Agent identifier.
    pub id: AgentId,
    /// Grid cell.
    pub position: Position,
    /// Profile tag.
    pub profile: Profile,
    /// Born today.
    pub newborn: bool,
}

/// Everything a grid display needs, detached from live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridView {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Living agents.
    pub agents: Vec<AgentMarker>,
    /// Cells holding uncollected resources.
    pub resources: Vec<Position>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Position of the simulation's random stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    /// The 32-byte stream seed.
    pub seed: [u8; 32],
    /// Stream selector.
    pub stream: u64,
    /// Word offset within the stream.
    pub word_pos: u128,
}

/// Descriptive data attached to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Snapshot format version.
    pub version: u32,
    /// Wall-clock time the snapshot was taken.
    pub created_at: DateTime<Utc>,
    /// Seed the run was started with.
    pub seed: u64,
}

/// A detached copy of the full simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Descriptive metadata.
    pub metadata: SnapshotMetadata,
    /// Days completed.
    pub day: u64,
    /// Every agent ever created, dead ones included.
    pub agents: Vec<AgentState>,
    /// The current day's resources.
    pub resources: Vec<Resource>,
    /// Random stream position.
    pub rng: RngState,
}

impl SimulationSnapshot {
    /// Current snapshot format version.
    pub const VERSION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        let agent = Position::new(3, 3);
        assert_eq!(agent.manhattan(Position::new(1, 1)), 4);
        assert_eq!(agent.manhattan(Position::new(5, 5)), 4);
        assert_eq!(agent.manhattan(Position::new(9, 9)), 12);
        assert_eq!(agent.manhattan(agent), 0);
    }

    #[test]
    fn new_resource_is_uncollected() {
        let resource = Resource::new(Position::new(2, 4), 1);
        assert!(!resource.collected);
        assert_eq!(resource.to_string(), "Resource(2, 4, value=1)");
    }

    #[test]
    fn rng_state_roundtrip_serde() {
        let state = RngState {
            seed: [9; 32],
            stream: 3,
            word_pos: u128::from(u64::MAX) + 17,
        };
        let json = serde_json::to_string(&state).unwrap_or_default();
        let restored: Result<RngState, _> = serde_json::from_str(&json);
        assert!(restored.is_ok());
        if let Ok(restored) = restored {
            assert_eq!(restored, state);
        }
    }
}
