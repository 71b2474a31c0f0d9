//! Error types for mpcd-comm.

use thiserror::Error;

use mpcd_topology::{Axis, Face, Rank};

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a migration call.
///
/// Every variant is fatal for the simulation step: a step that cannot finish
/// migrating cannot safely continue.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed to deliver a message.
    #[error("transport error: {0}")]
    Transport(#[from] mpcd_transfer::TransportError),

    /// A staging buffer was misused.
    #[error("buffer error: {0}")]
    Buffer(#[from] mpcd_buffer::BufferError),

    /// The size message from a peer was not a single count.
    #[error("malformed size message from rank {peer} on {face}: {len} bytes")]
    MalformedSize { peer: Rank, face: Face, len: usize },

    /// The payload from a peer does not match the count it announced.
    #[error("payload from rank {peer} on {face} is {actual} bytes, expected {expected}")]
    PayloadMismatch {
        peer: Rank,
        face: Face,
        expected: usize,
        actual: usize,
    },

    /// More records leave through a face than a size message can announce.
    #[error("cannot send {count} records across {face}: count exceeds the size message")]
    SendOverflow { face: Face, count: usize },

    /// The coverage box sticks out of the global box on both sides of an axis.
    #[error("coverage box protrudes past both sides of the global box along {axis}")]
    InvalidCoverage { axis: Axis },

    /// The process grid places the local process on a different rank than
    /// the transport reports.
    #[error("grid places the local process at rank {grid} but the transport is rank {transport}")]
    RankMismatch { grid: Rank, transport: Rank },

    /// The process grid and the transport disagree on the number of ranks.
    #[error("grid has {domains} domains but the transport spans {ranks} ranks")]
    GridSizeMismatch { domains: u32, ranks: u32 },

    /// Size and payload messages would share a tag.
    #[error("size and payload messages must use distinct tags (both {0})")]
    TagCollision(mpcd_transfer::Tag),
}
