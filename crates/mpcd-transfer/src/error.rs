//! Error types for mpcd-transfer.

use std::time::Duration;

use thiserror::Error;

use crate::{Rank, Tag};

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport failures. None of these are retried.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Destination or source rank does not exist.
    #[error("rank {rank} out of range for a communicator of {num_ranks} ranks")]
    InvalidRank { rank: Rank, num_ranks: u32 },

    /// The peer's endpoint is gone.
    #[error("peer {peer} disconnected")]
    Disconnected { peer: Rank },

    /// A receive did not complete within the configured timeout.
    #[error("timed out after {after:?} waiting for tag {tag} from rank {peer}")]
    Timeout { peer: Rank, tag: Tag, after: Duration },

    /// The blocking runtime backing an endpoint could not be created.
    #[error("failed to start transport runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
