//! Axis-aligned boxes with per-axis periodicity.

use mpcd_topology::Axis;

/// Floating-point type of particle coordinates.
pub type Scalar = f64;

/// A point or vector in simulation space.
pub type Scalar3 = [Scalar; 3];

/// Axis-aligned box `[lo, hi)` with a periodicity flag per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxDim {
    lo: Scalar3,
    hi: Scalar3,
    periodic: [bool; 3],
}

impl BoxDim {
    /// Box periodic along every axis.
    pub const fn new(lo: Scalar3, hi: Scalar3) -> Self {
        Self {
            lo,
            hi,
            periodic: [true; 3],
        }
    }

    /// Cube of side `length` centered on the origin.
    pub fn cube(length: Scalar) -> Self {
        let half = 0.5 * length;
        Self::new([-half; 3], [half; 3])
    }

    #[must_use]
    pub const fn with_periodic(mut self, periodic: [bool; 3]) -> Self {
        self.periodic = periodic;
        self
    }

    pub const fn lo(&self) -> Scalar3 {
        self.lo
    }

    pub const fn hi(&self) -> Scalar3 {
        self.hi
    }

    pub const fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    pub const fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    /// Edge lengths.
    pub fn lengths(&self) -> Scalar3 {
        [
            self.hi[0] - self.lo[0],
            self.hi[1] - self.lo[1],
            self.hi[2] - self.lo[2],
        ]
    }

    /// Whether `pos` lies in `[lo, hi)` on every axis.
    pub fn contains(&self, pos: Scalar3) -> bool {
        Axis::ALL.iter().all(|a| {
            let i = a.index();
            pos[i] >= self.lo[i] && pos[i] < self.hi[i]
        })
    }

    /// The same box translated by `shift`, keeping periodicity.
    #[must_use]
    pub fn shifted(&self, shift: Scalar3) -> Self {
        let mut out = *self;
        for i in 0..3 {
            out.lo[i] += shift[i];
            out.hi[i] += shift[i];
        }
        out
    }

    /// Map `pos` back into the box along each periodic axis.
    ///
    /// Moves by at most one box length per axis, counting the move in
    /// `image`. Non-periodic axes are left alone.
    pub fn wrap(&self, pos: &mut Scalar3, image: &mut [i32; 3]) {
        let lengths = self.lengths();
        for axis in Axis::ALL {
            let i = axis.index();
            if !self.periodic[i] {
                continue;
            }
            if pos[i] >= self.hi[i] {
                pos[i] -= lengths[i];
                image[i] += 1;
            } else if pos[i] < self.lo[i] {
                pos[i] += lengths[i];
                image[i] -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_containment() {
        let b = BoxDim::new([0.0; 3], [1.0; 3]);
        assert!(b.contains([0.0, 0.0, 0.0]));
        assert!(b.contains([0.5, 0.999, 0.0]));
        assert!(!b.contains([1.0, 0.5, 0.5]));
        assert!(!b.contains([0.5, -1e-12, 0.5]));
    }

    #[test]
    fn test_cube_and_lengths() {
        let b = BoxDim::cube(10.0);
        assert_eq!(b.lo(), [-5.0; 3]);
        assert_eq!(b.lengths(), [10.0; 3]);
        assert_eq!(b.periodic(), [true; 3]);
    }

    #[test]
    fn test_shift_keeps_lengths() {
        let b = BoxDim::cube(4.0).with_periodic([true, false, true]);
        let s = b.shifted([0.5, 0.0, -1.0]);
        assert_eq!(s.lo(), [-1.5, -2.0, -3.0]);
        assert_eq!(s.lengths(), b.lengths());
        assert!(!s.is_periodic(Axis::Y));
    }

    #[test]
    fn test_wrap_moves_one_length() {
        let b = BoxDim::cube(10.0);
        let mut image = [0; 3];

        let mut pos = [5.0, -5.5, 1.0];
        b.wrap(&mut pos, &mut image);
        assert_eq!(pos, [-5.0, 4.5, 1.0]);
        assert_eq!(image, [1, -1, 0]);
    }

    #[test]
    fn test_wrap_skips_non_periodic_axes() {
        let b = BoxDim::cube(10.0).with_periodic([false, true, false]);
        let mut image = [0; 3];
        let mut pos = [7.0, 7.0, -7.0];
        b.wrap(&mut pos, &mut image);
        assert_eq!(pos, [7.0, -3.0, -7.0]);
        assert_eq!(image, [0, 1, 0]);
    }
}
