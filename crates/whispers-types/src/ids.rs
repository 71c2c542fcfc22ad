//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Agent identifiers are opaque. The simulation derives them from its
//! seeded random stream (see `whispers_agents::agent`) so that two runs with
//! the same seed produce the same ids; the wrapper itself only carries the
//! value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Build an identifier from 16 random bytes (UUID v4 layout).
            pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// First eight characters of the hyphenated form, for log lines.
            pub fn short(&self) -> String {
                self.0.to_string().chars().take(8).collect()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent in the simulation.
    AgentId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_id() {
        let a = AgentId::from_random_bytes([7; 16]);
        let b = AgentId::from_random_bytes([7; 16]);
        assert_eq!(a, b);
    }

    #[test]
    fn ids_are_version_four() {
        let id = AgentId::from_random_bytes([0xAB; 16]);
        assert_eq!(id.into_inner().get_version_num(), 4);
    }

    #[test]
    fn short_form_is_eight_chars() {
        let id = AgentId::from_random_bytes([1; 16]);
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = AgentId::from_random_bytes([3; 16]);
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<AgentId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
        if let Ok(restored) = restored {
            assert_eq!(restored, original);
        }
    }
}
