//! Neighbor directions and transfer faces.
//!
//! A [`Direction`] is one of the 26 unit offsets around a domain. Its index is
//! `((dz+1)*3 + (dy+1))*3 + (dx+1)`, so the origin would be 13 and the bits of
//! a direction mask never collide.
//!
//! A [`Face`] is one of the 6 axis-aligned directions particles migrate
//! across. The face discriminant doubles as its bit in a [`CommFlags`] mask.

use crate::{Axis, GridCoord};

/// Per-particle bitmask of crossed faces. Zero means the particle stays.
pub type CommFlags = u32;

/// One of the 26 offsets in `{-1,0,1}^3` excluding the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
}

impl Direction {
    /// All 26 directions, enumerated with x outermost and z innermost.
    pub const ALL: [Self; 26] = Self::enumerate();

    const fn enumerate() -> [Self; 26] {
        let mut out = [Self { dx: 0, dy: 0, dz: 0 }; 26];
        let mut n = 0;
        let mut ix = -1;
        while ix <= 1 {
            let mut iy = -1;
            while iy <= 1 {
                let mut iz = -1;
                while iz <= 1 {
                    if ix != 0 || iy != 0 || iz != 0 {
                        out[n] = Self { dx: ix, dy: iy, dz: iz };
                        n += 1;
                    }
                    iz += 1;
                }
                iy += 1;
            }
            ix += 1;
        }
        out
    }

    /// Create a direction. Returns `None` for the zero offset or any
    /// component outside `{-1,0,1}`.
    pub const fn new(dx: i8, dy: i8, dz: i8) -> Option<Self> {
        let in_range = dx >= -1 && dx <= 1 && dy >= -1 && dy <= 1 && dz >= -1 && dz <= 1;
        if !in_range || (dx == 0 && dy == 0 && dz == 0) {
            None
        } else {
            Some(Self { dx, dy, dz })
        }
    }

    /// Stable index in `0..27` (13 is never produced).
    #[inline]
    pub const fn index(&self) -> u32 {
        (((self.dz + 1) as u32 * 3 + (self.dy + 1) as u32) * 3) + (self.dx + 1) as u32
    }

    /// Single-bit mask for this direction.
    #[inline]
    pub const fn mask(&self) -> u32 {
        1 << self.index()
    }

    /// Component along `axis`.
    pub const fn get(&self, axis: Axis) -> i8 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
            Axis::Z => self.dz,
        }
    }

    /// The direction as a grid offset.
    pub const fn offset(&self) -> GridCoord {
        GridCoord::new(self.dx as i64, self.dy as i64, self.dz as i64)
    }
}

/// Axis-aligned face a particle can migrate across.
///
/// The discriminant is the bit index in [`CommFlags`]. Even faces point in the
/// positive axis direction, odd faces in the negative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Face {
    East = 0,
    West = 1,
    North = 2,
    South = 3,
    Up = 4,
    Down = 5,
}

impl Face {
    /// Faces in migration order.
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::West,
        Self::North,
        Self::South,
        Self::Up,
        Self::Down,
    ];

    /// Face for a migration loop index.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Bit index in a [`CommFlags`] mask.
    #[inline]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Single-bit comm mask for this face.
    #[inline]
    pub const fn mask(self) -> CommFlags {
        1 << self.bit()
    }

    /// Axis this face is normal to.
    pub const fn axis(self) -> Axis {
        match self {
            Self::East | Self::West => Axis::X,
            Self::North | Self::South => Axis::Y,
            Self::Up | Self::Down => Axis::Z,
        }
    }

    /// The face on the other side of the same axis.
    pub const fn opposite(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::West => Self::East,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// True for east, north and up.
    pub const fn is_upper(self) -> bool {
        self.bit() % 2 == 0
    }

    /// The face as one of the 26 directions.
    pub const fn direction(self) -> Direction {
        let step: i8 = if self.is_upper() { 1 } else { -1 };
        match self.axis() {
            Axis::X => Direction { dx: step, dy: 0, dz: 0 },
            Axis::Y => Direction { dx: 0, dy: step, dz: 0 },
            Axis::Z => Direction { dx: 0, dy: 0, dz: step },
        }
    }

    /// Upper face of `axis`.
    pub const fn upper(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::East,
            Axis::Y => Self::North,
            Axis::Z => Self::Up,
        }
    }

    /// Lower face of `axis`.
    pub const fn lower(axis: Axis) -> Self {
        Self::upper(axis).opposite()
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::East => write!(f, "east"),
            Self::West => write!(f, "west"),
            Self::North => write!(f, "north"),
            Self::South => write!(f, "south"),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_unique() {
        let dirs = Direction::ALL;
        for i in 0..dirs.len() {
            for j in (i + 1)..dirs.len() {
                assert_ne!(dirs[i], dirs[j], "Duplicate direction at {} and {}", i, j);
            }
        }
    }

    #[test]
    fn direction_indices_skip_origin() {
        let mut seen = 0u32;
        for dir in Direction::ALL {
            assert_ne!(dir.index(), 13);
            assert!(dir.index() < 27);
            assert_eq!(seen & dir.mask(), 0, "bit reused by {:?}", dir);
            seen |= dir.mask();
        }
        assert_eq!(seen.count_ones(), 26);
    }

    #[test]
    fn enumeration_is_x_major() {
        assert_eq!(Direction::ALL[0], Direction { dx: -1, dy: -1, dz: -1 });
        assert_eq!(Direction::ALL[1], Direction { dx: -1, dy: -1, dz: 0 });
        assert_eq!(Direction::ALL[25], Direction { dx: 1, dy: 1, dz: 1 });
    }

    #[test]
    fn new_rejects_origin_and_out_of_range() {
        assert!(Direction::new(0, 0, 0).is_none());
        assert!(Direction::new(2, 0, 0).is_none());
        assert_eq!(Direction::new(1, 0, -1).map(|d| d.index()), Some(5));
    }

    #[test]
    fn face_bits_are_discriminants() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.bit() as usize, i);
            assert_eq!(Face::from_index(i), Some(*face));
        }
        assert_eq!(Face::from_index(6), None);
    }

    #[test]
    fn opposite_faces_pair_up() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_eq!(face.opposite().axis(), face.axis());
            assert_ne!(face.opposite(), face);
            assert_eq!(face.bit() ^ 1, face.opposite().bit());
        }
    }

    #[test]
    fn face_directions_point_along_axis() {
        assert_eq!(Face::East.direction().offset(), GridCoord::new(1, 0, 0));
        assert_eq!(Face::South.direction().offset(), GridCoord::new(0, -1, 0));
        assert_eq!(Face::Down.direction().offset(), GridCoord::new(0, 0, -1));
        assert_eq!(Face::upper(Axis::Z), Face::Up);
        assert_eq!(Face::lower(Axis::X), Face::West);
    }
}
