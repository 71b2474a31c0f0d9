//! MPCD Process-Grid Topology
//!
//! Cartesian domain decomposition of a periodic simulation box into a 3D grid
//! of processes, and the static neighbor relations between them.
//!
//! # Directions and Faces
//!
//! Every process sees up to 26 neighbors, one per offset in `{-1,0,1}^3`
//! excluding the origin. Each offset is a [`Direction`] with a stable index
//! and bit in a `u32` mask.
//!
//! Particles only ever move across the 6 axis-aligned [`Face`]s
//! (east/west/north/south/up/down). The face discriminant is the single
//! authoritative bit table for per-particle communication flags.
//!
//! # Wrap-around Aliasing
//!
//! The grid is periodic. When an axis has extent 2, the +1 and -1 offsets
//! along it fold onto the same process; when an axis has extent 1 there is
//! nobody to talk to along it at all. The [`NeighborTable`] drops the latter
//! and merges the former, so each reachable rank appears exactly once with
//! the OR of every direction mask that resolves to it.

mod direction;
mod error;
mod grid;
mod neighbors;
mod process_grid;

pub use direction::{CommFlags, Direction, Face};
pub use error::{Error, Result};
pub use grid::{Axis, GridCoord, GridDims};
pub use neighbors::{NeighborEntry, NeighborTable};
pub use process_grid::{CartesianGrid, ProcessGrid};

/// Process rank within the communicator.
pub type Rank = u32;

/// Maximum number of distinct directional neighbors (3^3 - 1).
pub const MAX_NEIGHBORS: usize = 26;

/// Number of axis-aligned transfer faces.
pub const NUM_FACES: usize = 6;

/// Number of offsets in `{-1,0,1}^3`, including the origin.
pub const NUM_OFFSETS: usize = 27;

// Every direction bit must fit in a u32 mask
const _: () = assert!(NUM_OFFSETS <= u32::BITS as usize);
const _: () = assert!(MAX_NEIGHBORS + 1 == NUM_OFFSETS);
