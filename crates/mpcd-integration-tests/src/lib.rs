//! Multi-rank harness for MPCD migration tests.
//!
//! Runs every rank of a decomposition on its own thread, connected through
//! a [`LocalFabric`] with a receive timeout so a protocol bug fails the test
//! instead of hanging it.

use std::thread;
use std::time::Duration;

use mpcd_comm::{BoxDim, Migrator, MigratorConfig, Particle, ParticleData, StaticCoverage};
use mpcd_topology::{Axis, CartesianGrid, GridCoord, GridDims, ProcessGrid, Rank};
use mpcd_transfer::{LocalFabric, LocalFabricConfig, LocalTransport, Transport};
use tracing_subscriber::EnvFilter;

pub use mpcd_comm::Result;

/// Receive timeout used by every harness fabric.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// Route test logs through the test writer. `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();
}

/// Even split of a global box over a process grid.
#[derive(Debug, Clone, Copy)]
pub struct Decomposition {
    pub dims: GridDims,
    pub global: BoxDim,
}

impl Decomposition {
    pub fn new(dims: GridDims, global: BoxDim) -> Self {
        Self { dims, global }
    }

    /// Subdomain owned by the process at `coord`.
    pub fn local_box(&self, coord: GridCoord) -> BoxDim {
        let glo = self.global.lo();
        let len = self.global.lengths();
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            let n = self.dims.extent(axis) as f64;
            let c = coord.get(axis) as f64;
            lo[i] = glo[i] + len[i] * c / n;
            hi[i] = glo[i] + len[i] * (c + 1.0) / n;
        }
        BoxDim::new(lo, hi)
    }

    /// Rank whose subdomain contains `pos`, if any.
    pub fn owner_of(&self, pos: [f64; 3]) -> Option<Rank> {
        (0..self.dims.num_domains()).find(|&rank| self.local_box(self.dims.coord(rank)).contains(pos))
    }
}

/// One rank's view of the running simulation.
pub struct RankSim {
    pub rank: Rank,
    pub grid: CartesianGrid,
    pub local: BoxDim,
    pub migrator: Migrator<LocalTransport, Particle>,
    pub store: ParticleData<Particle>,
}

impl RankSim {
    /// Run one migration on the local store.
    pub fn migrate(&mut self, timestep: u64) -> Result<mpcd_comm::MigrationOutcome> {
        self.migrator.communicate(timestep, &mut self.store)
    }

    /// Whether every local particle lies inside the local subdomain.
    pub fn owns_all(&self) -> bool {
        self.store.iter().all(|p| self.local.contains(p.pos))
    }

    pub fn tags(&self) -> Vec<u32> {
        let mut tags: Vec<u32> = self.store.iter().map(|p| p.tag).collect();
        tags.sort_unstable();
        tags
    }

    /// Wait for every other rank.
    pub fn barrier(&self) {
        self.migrator.transport().barrier();
    }
}

/// Run `body` once per rank of `decomp`, each on its own thread.
///
/// Results come back in rank order. A panic on any rank is re-raised here.
pub fn run_ranks<F, T>(decomp: Decomposition, config: MigratorConfig, body: F) -> Vec<T>
where
    F: Fn(RankSim) -> T + Send + Sync + Clone + 'static,
    T: Send + 'static,
{
    let fabric = LocalFabricConfig::default().with_recv_timeout(RECV_TIMEOUT);
    let endpoints = match LocalFabric::build(decomp.dims.num_domains(), fabric) {
        Ok(endpoints) => endpoints,
        Err(e) => panic!("failed to build local fabric: {e}"),
    };

    let handles: Vec<_> = endpoints
        .into_iter()
        .map(|transport| {
            let body = body.clone();
            let config = config.clone();
            thread::Builder::new()
                .name(format!("rank-{}", transport.rank()))
                .spawn(move || {
                    let rank = transport.rank();
                    let sim = match start_rank(decomp, rank, transport, config) {
                        Ok(sim) => sim,
                        Err(e) => panic!("rank {rank} failed to start: {e}"),
                    };
                    body(sim)
                })
        })
        .collect();

    handles
        .into_iter()
        .map(|h| match h {
            Ok(handle) => handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
            Err(e) => panic!("failed to spawn rank thread: {e}"),
        })
        .collect()
}

fn start_rank(
    decomp: Decomposition,
    rank: Rank,
    transport: LocalTransport,
    config: MigratorConfig,
) -> std::result::Result<RankSim, Box<dyn std::error::Error>> {
    let grid = CartesianGrid::for_rank(decomp.dims, rank)?;
    let local = decomp.local_box(grid.grid_position());
    let migrator = Migrator::new(transport, &grid, decomp.global, StaticCoverage::new(local), config)?;
    Ok(RankSim {
        rank,
        grid,
        local,
        migrator,
        store: ParticleData::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_boxes_tile_the_global_box() {
        let decomp = Decomposition::new(GridDims::new(2, 1, 1), BoxDim::cube(10.0));
        let west = decomp.local_box(GridCoord::new(0, 0, 0));
        let east = decomp.local_box(GridCoord::new(1, 0, 0));
        assert_eq!(west.lo(), [-5.0; 3]);
        assert_eq!(west.hi(), [0.0, 5.0, 5.0]);
        assert_eq!(east.lo(), [0.0, -5.0, -5.0]);
        assert_eq!(decomp.owner_of([0.0, 0.0, 0.0]), Some(1));
        assert_eq!(decomp.owner_of([-0.1, 0.0, 0.0]), Some(0));
        assert_eq!(decomp.owner_of([5.0, 0.0, 0.0]), None);
    }

    #[test]
    fn ranks_run_in_parallel() {
        let decomp = Decomposition::new(GridDims::new(2, 2, 1), BoxDim::cube(4.0));
        let ranks = run_ranks(decomp, MigratorConfig::default(), |sim| {
            sim.barrier();
            sim.rank
        });
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }
}
