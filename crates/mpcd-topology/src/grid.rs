//! Integer coordinates in the process grid.
//!
//! Grid positions are signed so that neighbor offsets can step off either end
//! of the grid before being folded back in by [`GridDims::fold`].

use std::ops::{Add, Neg, Sub};

/// A spatial axis of the simulation box and the process grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in storage order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis in a 3-vector.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// A position (or offset) in the 3D process grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl GridCoord {
    /// Origin of the process grid.
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a new coordinate.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    pub const fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl Add for GridCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for GridCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for GridCoord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Extents of the process grid (width, height, depth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDims {
    pub w: u32,
    pub h: u32,
    pub d: u32,
}

impl GridDims {
    /// A single process owning the whole box.
    pub const SINGLE: Self = Self { w: 1, h: 1, d: 1 };

    pub const fn new(w: u32, h: u32, d: u32) -> Self {
        Self { w, h, d }
    }

    /// Number of processes along `axis`.
    pub const fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.w,
            Axis::Y => self.h,
            Axis::Z => self.d,
        }
    }

    /// Whether the grid is split along `axis`.
    ///
    /// An axis with extent 1 has no peer to exchange with: every offset along
    /// it would wrap back to the local process.
    pub const fn is_communicating(&self, axis: Axis) -> bool {
        self.extent(axis) > 1
    }

    /// Total number of domains.
    pub const fn num_domains(&self) -> u32 {
        self.w * self.h * self.d
    }

    /// True if any extent is zero.
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0 || self.d == 0
    }

    /// Whether `coord` lies inside the grid.
    pub fn contains(&self, coord: GridCoord) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| coord.get(a) >= 0 && coord.get(a) < self.extent(a) as i64)
    }

    /// Fold a coordinate back into the grid (periodic wrap-around).
    pub fn fold(&self, coord: GridCoord) -> GridCoord {
        GridCoord {
            x: coord.x.rem_euclid(self.w as i64),
            y: coord.y.rem_euclid(self.h as i64),
            z: coord.z.rem_euclid(self.d as i64),
        }
    }

    /// Linear domain index of an in-grid coordinate, x varying fastest.
    pub fn index(&self, coord: GridCoord) -> u32 {
        debug_assert!(self.contains(coord), "{} outside {}", coord, self);
        ((coord.z as u32 * self.h) + coord.y as u32) * self.w + coord.x as u32
    }

    /// Inverse of [`index`](Self::index).
    pub fn coord(&self, index: u32) -> GridCoord {
        let x = index % self.w;
        let y = (index / self.w) % self.h;
        let z = index / (self.w * self.h);
        GridCoord::new(x as i64, y as i64, z as i64)
    }
}

impl std::fmt::Display for GridDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.w, self.h, self.d)
    }
}
