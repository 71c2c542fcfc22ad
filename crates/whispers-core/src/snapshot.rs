//! Snapshot persistence.
//!
//! A [`SimulationSnapshot`] is a detached copy of the full simulation state
//! (see [`crate::Simulation::snapshot`]). This module writes it to and reads it
//! from a JSON file, and checks the format version on load.

use std::path::Path;

use whispers_types::SimulationSnapshot;

/// Errors saving or loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read or write the file.
    #[error("snapshot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to encode or decode JSON.
    #[error("snapshot JSON is invalid: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The file was written by an incompatible format version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
}

/// Encode a snapshot as pretty-printed JSON.
pub fn to_json(snapshot: &SimulationSnapshot) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Decode a snapshot from JSON, rejecting other format versions.
pub fn from_json(json: &str) -> Result<SimulationSnapshot, SnapshotError> {
    let snapshot: SimulationSnapshot = serde_json::from_str(json)?;
    if snapshot.metadata.version != SimulationSnapshot::VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.metadata.version,
            expected: SimulationSnapshot::VERSION,
        });
    }
    Ok(snapshot)
}

/// Write a snapshot to `path`.
pub fn save(snapshot: &SimulationSnapshot, path: &Path) -> Result<(), SnapshotError> {
    std::fs::write(path, to_json(snapshot)?)?;
    tracing::info!(path = %path.display(), day = snapshot.day, "snapshot saved");
    Ok(())
}

/// Read a snapshot from `path`.
pub fn load(path: &Path) -> Result<SimulationSnapshot, SnapshotError> {
    let contents = std::fs::read_to_string(path)?;
    let snapshot = from_json(&contents)?;
    tracing::info!(path = %path.display(), day = snapshot.day, "snapshot loaded");
    Ok(snapshot)
}
