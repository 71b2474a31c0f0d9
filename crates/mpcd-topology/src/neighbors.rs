//! 26-direction neighbor table with wrap-around deduplication.
//!
//! Built once from a [`ProcessGrid`]. Offsets along axes that are not split
//! are skipped outright, so a process never lists itself through a periodic
//! wrap of an unsplit axis. On small grids several directions can still fold
//! onto the same rank (extent 2 makes +1 and -1 coincide); those are merged
//! into one [`NeighborEntry`] whose mask is the OR of all their direction bits.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{Axis, Direction, Face, GridDims, ProcessGrid, Rank, MAX_NEIGHBORS, NUM_FACES};

/// A neighboring rank and the directions through which it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborEntry {
    pub rank: Rank,
    /// OR of [`Direction::mask`] for every direction resolving to `rank`.
    pub mask: u32,
}

impl NeighborEntry {
    /// Whether `dir` resolves to this neighbor.
    pub const fn contains(&self, dir: Direction) -> bool {
        self.mask & dir.mask() != 0
    }

    /// Directions resolving to this neighbor, in enumeration order.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

/// Static neighbor relations of the local process.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    dims: GridDims,
    /// One entry per surviving direction, before deduplication.
    raw: Vec<NeighborEntry>,
    /// One entry per distinct rank, sorted by rank.
    unique: Vec<NeighborEntry>,
    /// Rank across each face, indexed by [`Face::bit`].
    face_ranks: [Rank; NUM_FACES],
}

impl NeighborTable {
    /// Enumerate and deduplicate the neighbors of the local process.
    pub fn build<G: ProcessGrid + ?Sized>(grid: &G) -> Self {
        let dims = grid.grid_extents();
        let position = grid.grid_position();

        let mut raw = Vec::with_capacity(MAX_NEIGHBORS);
        for dir in Direction::ALL {
            // only if communicating along every axis the offset moves in
            let blocked = Axis::ALL
                .iter()
                .any(|&a| dir.get(a) != 0 && !dims.is_communicating(a));
            if blocked {
                continue;
            }

            let coord = dims.fold(position + dir.offset());
            raw.push(NeighborEntry {
                rank: grid.rank_at(coord),
                mask: dir.mask(),
            });
        }

        // filter neighbors, combining adjacency masks
        let mut merged: BTreeMap<Rank, u32> = BTreeMap::new();
        for entry in &raw {
            *merged.entry(entry.rank).or_insert(0) |= entry.mask;
        }
        let unique: Vec<NeighborEntry> = merged
            .into_iter()
            .map(|(rank, mask)| NeighborEntry { rank, mask })
            .collect();

        let face_ranks = Face::ALL.map(|face| grid.neighbor_rank(face));

        debug!(
            "Neighbor table for {} in {}: {} directions, {} unique ranks {:?}",
            position,
            dims,
            raw.len(),
            unique.len(),
            unique.iter().map(|e| e.rank).collect::<Vec<_>>()
        );

        Self {
            dims,
            raw,
            unique,
            face_ranks,
        }
    }

    /// Distinct neighbors, sorted by rank.
    pub fn unique_neighbors(&self) -> &[NeighborEntry] {
        &self.unique
    }

    /// Per-direction neighbors in enumeration order, duplicates included.
    pub fn raw_neighbors(&self) -> &[NeighborEntry] {
        &self.raw
    }

    /// Rank across `face`.
    pub fn neighbor_rank(&self, face: Face) -> Rank {
        self.face_ranks[face.bit() as usize]
    }

    /// Combined direction mask of `rank`, if it is a neighbor.
    pub fn mask_of(&self, rank: Rank) -> Option<u32> {
        self.unique
            .binary_search_by_key(&rank, |e| e.rank)
            .ok()
            .map(|i| self.unique[i].mask)
    }

    /// Whether `rank` is a neighbor through any direction.
    pub fn is_neighbor(&self, rank: Rank) -> bool {
        self.mask_of(rank).is_some()
    }

    /// Whether particles migrate across `face` at all.
    pub fn is_communicating(&self, face: Face) -> bool {
        self.dims.is_communicating(face.axis())
    }

    /// Grid extents the table was built from.
    pub fn grid_extents(&self) -> GridDims {
        self.dims
    }

    /// Number of distinct neighbor ranks.
    pub fn len(&self) -> usize {
        self.unique.len()
    }

    /// True for an undivided box.
    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }
}
