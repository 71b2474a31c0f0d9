//! Source of the local coverage box.
//!
//! The coverage box is the local subdomain plus whatever margin the cell
//! list needs. It can change between steps (e.g. when the cell list is
//! shifted), so it is queried at the start of every migration.

use std::cell::Cell;

use crate::BoxDim;

/// Supplies the local coverage box.
pub trait CoverageProvider {
    fn coverage_box(&self) -> BoxDim;
}

impl<F> CoverageProvider for F
where
    F: Fn() -> BoxDim,
{
    fn coverage_box(&self) -> BoxDim {
        self()
    }
}

/// Coverage box held by value, replaceable between steps.
#[derive(Debug, Clone)]
pub struct StaticCoverage {
    bounds: Cell<BoxDim>,
}

impl StaticCoverage {
    pub fn new(bounds: BoxDim) -> Self {
        Self {
            bounds: Cell::new(bounds),
        }
    }

    pub fn set(&self, bounds: BoxDim) {
        self.bounds.set(bounds);
    }
}

impl CoverageProvider for StaticCoverage {
    fn coverage_box(&self) -> BoxDim {
        self.bounds.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn static_coverage_can_be_replaced() {
        let cov = StaticCoverage::new(BoxDim::cube(1.0));
        assert_eq!(cov.coverage_box(), BoxDim::cube(1.0));
        cov.set(BoxDim::cube(2.0));
        assert_eq!(cov.coverage_box().lengths(), [2.0; 3]);
    }

    #[test]
    fn closures_and_shared_providers() {
        let from_fn = || BoxDim::new([0.0; 3], [1.0, 2.0, 3.0]);
        assert_eq!(from_fn.coverage_box().hi(), [1.0, 2.0, 3.0]);

        let shared = Rc::new(StaticCoverage::new(BoxDim::cube(4.0)));
        let handle = Rc::clone(&shared);
        let provider: Box<dyn CoverageProvider> = Box::new(move || handle.coverage_box());
        shared.set(BoxDim::cube(8.0));
        assert_eq!(provider.coverage_box().lengths(), [8.0; 3]);
    }
}
