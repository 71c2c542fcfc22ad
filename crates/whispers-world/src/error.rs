//! Error types for the `whispers-world` crate.
//!
//! The only faults here are malformed construction parameters. Running out
//! of resources or partners is an ordinary outcome, reported through
//! `Option` and empty collections.

/// Errors raised when building a world component.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// The grid must have at least one cell in each direction.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The spawn rate must be finite and non-negative.
    #[error("invalid resource spawn rate: {0}")]
    InvalidSpawnRate(f64),
}
