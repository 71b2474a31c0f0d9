//! Boundary classification: which faces has each particle crossed.

use mpcd_topology::{Axis, CommFlags, Face};

use crate::{BoxDim, Scalar3};

/// Face bits for a single position against `bounds`.
///
/// Boundaries are half-open: a particle exactly on `hi` has left through the
/// upper face, one exactly on `lo` is still inside. At most one face per axis
/// is flagged, and zero means the particle stays.
#[inline]
pub fn comm_flags(bounds: &BoxDim, pos: Scalar3) -> CommFlags {
    let lo = bounds.lo();
    let hi = bounds.hi();
    let mut flags = 0;
    for axis in Axis::ALL {
        let i = axis.index();
        if pos[i] >= hi[i] {
            flags |= Face::upper(axis).mask();
        } else if pos[i] < lo[i] {
            flags |= Face::lower(axis).mask();
        }
    }
    flags
}

/// Face bits for every position, in order.
pub fn classify<I>(bounds: &BoxDim, positions: I) -> Vec<CommFlags>
where
    I: IntoIterator<Item = Scalar3>,
{
    positions
        .into_iter()
        .map(|pos| comm_flags(bounds, pos))
        .collect()
}
