//! Migration state, outcome and per-call statistics.

use std::cell::Cell;
use std::fmt;

use mpcd_topology::{Face, NUM_FACES};

/// Whether a migration is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationState {
    #[default]
    Idle,
    Communicating,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Idle => write!(f, "Idle"),
            MigrationState::Communicating => write!(f, "Communicating"),
        }
    }
}

/// Holds a migrator in `Communicating` until dropped.
pub(crate) struct CommunicatingGuard<'a> {
    state: &'a Cell<MigrationState>,
}

impl<'a> CommunicatingGuard<'a> {
    /// Enter `Communicating`, or `None` if already there.
    pub(crate) fn enter(state: &'a Cell<MigrationState>) -> Option<Self> {
        if state.get() == MigrationState::Communicating {
            return None;
        }
        state.set(MigrationState::Communicating);
        Some(Self { state })
    }
}

impl Drop for CommunicatingGuard<'_> {
    fn drop(&mut self) {
        self.state.set(MigrationState::Idle);
    }
}

/// Records moved across one face during a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceStats {
    /// Records sent to the neighbor across this face.
    pub sent: usize,
    /// Records received from the neighbor across the opposite face.
    pub received: usize,
}

/// Accounting for one completed migration call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MigrationStats {
    pub timestep: u64,
    /// Indexed by face bit. Inactive faces stay zero.
    pub faces: [FaceStats; NUM_FACES],
    /// Payload bytes sent, excluding size messages.
    pub bytes_sent: usize,
    /// Payload bytes received, excluding size messages.
    pub bytes_received: usize,
}

impl MigrationStats {
    pub(crate) fn new(timestep: u64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    pub fn face(&self, face: Face) -> FaceStats {
        self.faces[face.bit() as usize]
    }

    /// Total records sent.
    pub fn sent(&self) -> usize {
        self.faces.iter().map(|f| f.sent).sum()
    }

    /// Total records received.
    pub fn received(&self) -> usize {
        self.faces.iter().map(|f| f.received).sum()
    }
}

/// Result of a call to [`Migrator::communicate`](crate::Migrator::communicate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Every active face was exchanged.
    Completed(MigrationStats),
    /// A migration was already in progress; nothing was done.
    Ignored,
}

impl MigrationOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, MigrationOutcome::Ignored)
    }

    pub fn stats(&self) -> Option<&MigrationStats> {
        match self {
            MigrationOutcome::Completed(stats) => Some(stats),
            MigrationOutcome::Ignored => None,
        }
    }
}
