//! Error types for mpcd-topology.

use thiserror::Error;

use crate::{GridCoord, GridDims, Rank};

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a process grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Every axis of the grid needs at least one process.
    #[error("grid extents must be non-zero, got {0}")]
    EmptyGrid(GridDims),

    /// The rank does not exist in this grid.
    #[error("rank {rank} out of range for a grid of {num_domains} domains")]
    RankOutOfRange { rank: Rank, num_domains: u32 },

    /// The coordinate lies outside the grid.
    #[error("coordinate {coord} outside grid {dims}")]
    CoordOutOfRange { coord: GridCoord, dims: GridDims },

    /// A rank permutation must cover every domain exactly once.
    #[error("rank permutation has {actual} entries, expected {expected}")]
    PermutationLength { expected: usize, actual: usize },

    /// A rank permutation listed the same rank twice.
    #[error("rank {0} appears more than once in the rank permutation")]
    DuplicateRank(Rank),
}
