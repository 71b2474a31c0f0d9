//! Periodic wrap box for received particles.
//!
//! A rank on the edge of the process grid receives particles that left the
//! global box through the far side. Their coordinates are still expressed
//! in the sender's frame, so they sit one box length away from the local
//! subdomain. Wrapping them through a copy of the global box, shifted so
//! that it covers the local coverage box, brings them home.

use mpcd_topology::{Axis, GridDims};

use crate::{BoxDim, Error, Result, Scalar3};

/// Wrap box for a rank whose coverage box is `coverage`.
///
/// Along each split axis the global box is shifted by however far the
/// coverage box protrudes past it, and is periodic. Unsplit axes are neither
/// shifted nor periodic, since nothing crosses them here.
///
/// Fails if the coverage box protrudes past both sides of a split axis.
pub fn wrap_box(coverage: &BoxDim, global: &BoxDim, dims: GridDims) -> Result<BoxDim> {
    let lo = coverage.lo();
    let hi = coverage.hi();
    let global_lo = global.lo();
    let global_hi = global.hi();

    let mut shift: Scalar3 = [0.0; 3];
    let mut periodic = [false; 3];
    for axis in Axis::ALL {
        if !dims.is_communicating(axis) {
            continue;
        }
        let i = axis.index();
        let above = hi[i] > global_hi[i];
        let below = lo[i] < global_lo[i];
        if above && below {
            return Err(Error::InvalidCoverage { axis });
        }

        if above {
            shift[i] = hi[i] - global_hi[i];
        } else if below {
            shift[i] = lo[i] - global_lo[i];
        }
        periodic[i] = true;
    }

    Ok(global.shifted(shift).with_periodic(periodic))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> BoxDim {
        BoxDim::cube(10.0)
    }

    #[test]
    fn interior_coverage_is_unshifted() {
        let cov = BoxDim::new([-2.0, -5.0, -5.0], [2.0, 5.0, 5.0]);
        let w = wrap_box(&cov, &global(), GridDims::new(3, 1, 1)).unwrap();
        assert_eq!(w.lo(), global().lo());
        assert_eq!(w.periodic(), [true, false, false]);
    }

    #[test]
    fn upper_protrusion_shifts_up() {
        let cov = BoxDim::new([0.0, -5.0, -5.0], [5.5, 5.0, 5.0]);
        let w = wrap_box(&cov, &global(), GridDims::new(2, 1, 1)).unwrap();
        assert_eq!(w.lo(), [-4.5, -5.0, -5.0]);
        assert_eq!(w.hi(), [5.5, 5.0, 5.0]);
    }

    #[test]
    fn lower_protrusion_shifts_down() {
        let cov = BoxDim::new([-5.0, -5.25, -5.0], [5.0, 0.0, 5.0]);
        let w = wrap_box(&cov, &global(), GridDims::new(1, 2, 1)).unwrap();
        assert_eq!(w.lo(), [-5.0, -5.25, -5.0]);
        assert_eq!(w.hi(), [5.0, 4.75, 5.0]);
        assert_eq!(w.periodic(), [false, true, false]);
    }

    #[test]
    fn unsplit_axis_is_ignored() {
        // Protrudes on both sides of x, but x is not split
        let cov = BoxDim::new([-6.0, -5.0, 0.0], [6.0, 5.0, 5.0]);
        let w = wrap_box(&cov, &global(), GridDims::new(1, 1, 2)).unwrap();
        assert_eq!(w.lo()[0], -5.0);
        assert_eq!(w.periodic(), [false, false, true]);
    }

    #[test]
    fn both_sides_is_rejected() {
        let cov = BoxDim::new([-6.0, -5.0, -5.0], [6.0, 5.0, 5.0]);
        let err = wrap_box(&cov, &global(), GridDims::new(2, 2, 2)).unwrap_err();
        assert!(matches!(err, Error::InvalidCoverage { axis: Axis::X }));
    }

    #[test]
    fn received_particle_lands_inside() {
        // Rank on the low x edge receives a particle that left through +x
        let cov = BoxDim::new([-5.0, -5.0, -5.0], [0.0, 5.0, 5.0]);
        let w = wrap_box(&cov, &global(), GridDims::new(2, 1, 1)).unwrap();

        let mut pos = [5.25, 1.0, 1.0];
        let mut image = [0; 3];
        w.wrap(&mut pos, &mut image);
        assert_eq!(pos, [-4.75, 1.0, 1.0]);
        assert!(global().contains(pos));
    }
}
