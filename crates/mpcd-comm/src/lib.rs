//! MPCD Particle Migration
//!
//! Moves MPCD solvent particles between the ranks of a Cartesian domain
//! decomposition as they cross subdomain boundaries.
//!
//! # Components
//!
//! - [`comm_flags`] / [`classify`]: which faces each particle has crossed
//! - [`wrap_box`]: the shifted global box used to wrap received particles
//!   through the periodic boundary
//! - [`ParticleStore`]: the local particles, with [`ParticleData`] as the
//!   vector-backed implementation
//! - [`Migrator`]: the per-face pack/exchange/wrap/unpack protocol
//!
//! # Example
//!
//! ```rust,ignore
//! use mpcd_comm::{BoxDim, Migrator, MigratorConfig, Particle, ParticleData, StaticCoverage};
//! use mpcd_topology::{CartesianGrid, GridDims};
//!
//! let grid = CartesianGrid::for_rank(GridDims::new(2, 2, 1), transport.rank())?;
//! let migrator: Migrator<_, Particle> = Migrator::new(
//!     transport,
//!     &grid,
//!     BoxDim::cube(20.0),
//!     StaticCoverage::new(local_box),
//!     MigratorConfig::default(),
//! )?;
//!
//! for step in 0..n_steps {
//!     stream(&mut particles);
//!     migrator.communicate(step, &mut particles)?;
//! }
//! ```

mod boxdim;
mod config;
mod coverage;
mod error;
mod flags;
mod migrator;
mod particles;
mod record;
mod state;
mod wrap;

pub use boxdim::{BoxDim, Scalar, Scalar3};
pub use config::{MessageTags, MigratorConfig};
pub use coverage::{CoverageProvider, StaticCoverage};
pub use error::{Error, Result};
pub use flags::{classify, comm_flags};
pub use migrator::Migrator;
pub use particles::{ParticleData, ParticleStore};
pub use record::{Particle, ParticleRecord};
pub use state::{FaceStats, MigrationOutcome, MigrationState, MigrationStats};
pub use wrap::wrap_box;

pub use mpcd_topology::{CommFlags, Face};
