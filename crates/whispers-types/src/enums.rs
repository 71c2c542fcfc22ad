//! Enumeration types for the Whispers simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A personality archetype that determines an agent's default strategy
/// traits and the bias of its decision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Profile {
    /// Modest requests, fair demands, lenient acceptance.
    Cooperative,
    /// Large requests, high demands, exploits low-reputation partners.
    SelfInterested,
    /// Scales requests by resource abundance; sits between the other two.
    Adaptive,
}

impl Profile {
    /// All profiles in declaration order.
    pub const ALL: [Self; 3] = [Self::Cooperative, Self::SelfInterested, Self::Adaptive];

    /// The stable tag used in records and configuration.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Cooperative => "cooperative",
            Self::SelfInterested => "self_interested",
            Self::Adaptive => "adaptive",
        }
    }

    /// The two profiles other than `self`, in declaration order.
    pub const fn others(self) -> [Self; 2] {
        match self {
            Self::Cooperative => [Self::SelfInterested, Self::Adaptive],
            Self::SelfInterested => [Self::Cooperative, Self::Adaptive],
            Self::Adaptive => [Self::Cooperative, Self::SelfInterested],
        }
    }
}

impl core::fmt::Display for Profile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}
