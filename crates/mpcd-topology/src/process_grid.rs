//! Process grid: mapping between grid coordinates and ranks.
//!
//! The domain decomposition itself is built elsewhere; migration only needs
//! to ask where the local process sits, how large the grid is, and which rank
//! owns a given grid cell.

use crate::{Error, Face, GridCoord, GridDims, Rank, Result};

/// Query interface onto a Cartesian domain decomposition.
pub trait ProcessGrid {
    /// Grid position of the local process.
    fn grid_position(&self) -> GridCoord;

    /// Number of processes along each axis.
    fn grid_extents(&self) -> GridDims;

    /// Rank owning the (in-grid) coordinate.
    fn rank_at(&self, coord: GridCoord) -> Rank;

    /// Whether particles can migrate across `face`.
    fn is_communicating(&self, face: Face) -> bool {
        self.grid_extents().is_communicating(face.axis())
    }

    /// Rank directly across `face`, folding through the periodic boundary.
    ///
    /// Along an axis with extent 1 this is the local rank.
    fn neighbor_rank(&self, face: Face) -> Rank {
        let dims = self.grid_extents();
        let coord = dims.fold(self.grid_position() + face.direction().offset());
        self.rank_at(coord)
    }
}

/// Cartesian process grid with an optional rank permutation.
///
/// By default the domain index (x fastest) is the rank. A permutation lets
/// the caller mirror whatever ordering the launcher assigned.
#[derive(Debug, Clone)]
pub struct CartesianGrid {
    dims: GridDims,
    position: GridCoord,
    cart_ranks: Option<Vec<Rank>>,
}

impl CartesianGrid {
    /// Grid for the process at `position`.
    pub fn new(dims: GridDims, position: GridCoord) -> Result<Self> {
        if dims.is_empty() {
            return Err(Error::EmptyGrid(dims));
        }
        if !dims.contains(position) {
            return Err(Error::CoordOutOfRange { coord: position, dims });
        }
        Ok(Self {
            dims,
            position,
            cart_ranks: None,
        })
    }

    /// Grid for the process with identity rank ordering.
    pub fn for_rank(dims: GridDims, rank: Rank) -> Result<Self> {
        if dims.is_empty() {
            return Err(Error::EmptyGrid(dims));
        }
        if rank >= dims.num_domains() {
            return Err(Error::RankOutOfRange {
                rank,
                num_domains: dims.num_domains(),
            });
        }
        Self::new(dims, dims.coord(rank))
    }

    /// Use `cart_ranks[domain_index]` as the rank of each domain.
    pub fn with_cart_ranks(mut self, cart_ranks: Vec<Rank>) -> Result<Self> {
        let expected = self.dims.num_domains() as usize;
        if cart_ranks.len() != expected {
            return Err(Error::PermutationLength {
                expected,
                actual: cart_ranks.len(),
            });
        }
        let mut seen = vec![false; expected];
        for &rank in &cart_ranks {
            match seen.get_mut(rank as usize) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(Error::DuplicateRank(rank)),
                None => {
                    return Err(Error::RankOutOfRange {
                        rank,
                        num_domains: expected as u32,
                    })
                }
            }
        }
        self.cart_ranks = Some(cart_ranks);
        Ok(self)
    }

    /// Rank of the local process.
    pub fn rank(&self) -> Rank {
        self.rank_at(self.position)
    }

    /// Grid coordinate owned by `rank`.
    pub fn coord_of(&self, rank: Rank) -> Option<GridCoord> {
        match &self.cart_ranks {
            None => (rank < self.dims.num_domains()).then(|| self.dims.coord(rank)),
            Some(ranks) => ranks
                .iter()
                .position(|&r| r == rank)
                .map(|idx| self.dims.coord(idx as u32)),
        }
    }
}

impl ProcessGrid for CartesianGrid {
    fn grid_position(&self) -> GridCoord {
        self.position
    }

    fn grid_extents(&self) -> GridDims {
        self.dims
    }

    fn rank_at(&self, coord: GridCoord) -> Rank {
        let idx = self.dims.index(coord);
        match &self.cart_ranks {
            Some(ranks) => ranks[idx as usize],
            None => idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ranks() {
        let dims = GridDims::new(2, 2, 2);
        for rank in 0..8 {
            let grid = CartesianGrid::for_rank(dims, rank).unwrap();
            assert_eq!(grid.rank(), rank);
            assert_eq!(grid.coord_of(rank), Some(grid.grid_position()));
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            CartesianGrid::for_rank(GridDims::new(0, 1, 1), 0).unwrap_err(),
            Error::EmptyGrid(GridDims::new(0, 1, 1))
        );
        assert!(matches!(
            CartesianGrid::for_rank(GridDims::new(2, 1, 1), 2),
            Err(Error::RankOutOfRange { rank: 2, .. })
        ));
        assert!(matches!(
            CartesianGrid::new(GridDims::new(2, 1, 1), GridCoord::new(0, 1, 0)),
            Err(Error::CoordOutOfRange { .. })
        ));
    }

    #[test]
    fn permutation_is_validated() {
        let dims = GridDims::new(2, 1, 1);
        let grid = CartesianGrid::for_rank(dims, 0).unwrap();
        assert!(matches!(
            grid.clone().with_cart_ranks(vec![0]),
            Err(Error::PermutationLength { expected: 2, actual: 1 })
        ));
        assert_eq!(
            grid.clone().with_cart_ranks(vec![1, 1]).unwrap_err(),
            Error::DuplicateRank(1)
        );

        let permuted = grid.with_cart_ranks(vec![1, 0]).unwrap();
        assert_eq!(permuted.rank(), 1);
        assert_eq!(permuted.coord_of(0), Some(GridCoord::new(1, 0, 0)));
    }

    #[test]
    fn face_neighbors_wrap() {
        let dims = GridDims::new(3, 1, 1);
        let grid = CartesianGrid::for_rank(dims, 0).unwrap();
        assert_eq!(grid.neighbor_rank(Face::East), 1);
        assert_eq!(grid.neighbor_rank(Face::West), 2);
        // Unsplit axes resolve to ourselves
        assert_eq!(grid.neighbor_rank(Face::North), 0);
        assert!(!grid.is_communicating(Face::Up));
    }
}
