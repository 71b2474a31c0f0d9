//! Migration engine: moves particles that left the local subdomain to the
//! neighbor that now owns them.
//!
//! # Protocol
//!
//! Once per call, every local particle is classified against the coverage
//! box. Then, for each face in the fixed order east, west, north, south, up,
//! down (skipping faces along unsplit axes):
//!
//! 1. **pack**: particles flagged for the face move into the send buffer
//! 2. **exchange**: the record count goes to the neighbor across the face
//!    while the count from the neighbor across the opposite face comes in,
//!    then the raw records follow on a separate tag
//! 3. **wrap**: received positions are wrapped through the periodic wrap box
//! 4. **unpack**: received records join the local store
//!
//! Flags are not recomputed between faces. A particle that crossed a corner
//! moves along one axis per call and finishes on later steps.

use std::cell::{Cell, RefCell};
use std::mem::size_of;
use std::sync::Arc;

use bytes::Bytes;
use mpcd_buffer::{AccessLocation, AccessMode, DeviceSync, ManagedBuffer};
use mpcd_topology::{Axis, Face, NeighborTable, ProcessGrid};
use mpcd_transfer::Transport;
use tracing::{debug, debug_span, trace, warn};

use crate::state::CommunicatingGuard;
use crate::{
    classify, wrap_box, BoxDim, CoverageProvider, Error, FaceStats, MigrationOutcome,
    MigrationState, MigrationStats, MigratorConfig, ParticleRecord, ParticleStore, Result,
};

/// Particle migration between neighboring ranks.
///
/// `communicate` takes `&self`; the re-entrancy guard and staging buffers
/// live behind interior mutability so a nested call can be detected and
/// dropped instead of corrupting the buffers.
pub struct Migrator<T, R: ParticleRecord> {
    transport: T,
    neighbors: NeighborTable,
    global_box: BoxDim,
    coverage: Box<dyn CoverageProvider>,
    config: MigratorConfig,
    state: Cell<MigrationState>,
    sendbuf: RefCell<ManagedBuffer<R>>,
    recvbuf: RefCell<ManagedBuffer<R>>,
}

impl<T: Transport, R: ParticleRecord> Migrator<T, R> {
    /// Create a migrator for the local rank of `grid`.
    ///
    /// The neighbor table is built here and never rebuilt.
    pub fn new<G, C>(
        transport: T,
        grid: &G,
        global_box: BoxDim,
        coverage: C,
        config: MigratorConfig,
    ) -> Result<Self>
    where
        G: ProcessGrid + ?Sized,
        C: CoverageProvider + 'static,
    {
        if config.tags.size == config.tags.payload {
            return Err(Error::TagCollision(config.tags.size));
        }
        let domains = grid.grid_extents().num_domains();
        if domains != transport.num_ranks() {
            return Err(Error::GridSizeMismatch {
                domains,
                ranks: transport.num_ranks(),
            });
        }
        let grid_rank = grid.rank_at(grid.grid_position());
        if grid_rank != transport.rank() {
            return Err(Error::RankMismatch {
                grid: grid_rank,
                transport: transport.rank(),
            });
        }
        debug!(rank = transport.rank(), "constructing MPCD communicator");

        Ok(Self {
            transport,
            neighbors: NeighborTable::build(grid),
            global_box,
            coverage: Box::new(coverage),
            config,
            state: Cell::new(MigrationState::Idle),
            sendbuf: RefCell::new(ManagedBuffer::new()),
            recvbuf: RefCell::new(ManagedBuffer::new()),
        })
    }

    /// Back the staging buffers with device-visible memory.
    #[must_use]
    pub fn with_residency(self, residency: Arc<dyn DeviceSync>) -> Self {
        self.sendbuf
            .replace(ManagedBuffer::with_residency(Arc::clone(&residency)));
        self.recvbuf.replace(ManagedBuffer::with_residency(residency));
        self
    }

    pub fn state(&self) -> MigrationState {
        self.state.get()
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    pub fn global_box(&self) -> &BoxDim {
        &self.global_box
    }

    /// Whether particles are exchanged across `face`.
    pub fn is_communicating(&self, face: Face) -> bool {
        self.neighbors.is_communicating(face)
    }

    /// Migrate every particle that has left the coverage box.
    ///
    /// Blocks until all active faces are exchanged with their neighbors, so
    /// every rank must call this on the same step. A call made while another
    /// is in progress on this migrator is logged and ignored.
    pub fn communicate<S>(&self, timestep: u64, store: &mut S) -> Result<MigrationOutcome>
    where
        S: ParticleStore<Record = R>,
    {
        let Some(_guard) = CommunicatingGuard::enter(&self.state) else {
            warn!(timestep, "MPCD communication currently underway, ignoring request");
            return Ok(MigrationOutcome::Ignored);
        };

        let span = debug_span!("migrate", timestep, rank = self.transport.rank());
        let _enter = span.enter();

        let coverage = self.coverage.coverage_box();
        let wrap = wrap_box(&coverage, &self.global_box, self.neighbors.grid_extents())?;

        {
            let _span = debug_span!("comm_flags").entered();
            let flags = classify(&coverage, (0..store.len()).map(|idx| store.position(idx)));
            store.set_comm_flags(&flags);
        }

        let mut stats = MigrationStats::new(timestep);
        for face in Face::ALL {
            if !self.is_communicating(face) {
                continue;
            }
            let moved = self.migrate_face(face, &wrap, store)?;
            stats.bytes_sent += moved.sent * size_of::<R>();
            stats.bytes_received += moved.received * size_of::<R>();
            stats.faces[face.bit() as usize] = moved;
        }

        debug!(
            sent = stats.sent(),
            received = stats.received(),
            local = store.len(),
            "migration complete"
        );
        Ok(MigrationOutcome::Completed(stats))
    }

    fn migrate_face<S>(&self, face: Face, wrap: &BoxDim, store: &mut S) -> Result<FaceStats>
    where
        S: ParticleStore<Record = R>,
    {
        let mask = face.mask();
        let mut sendbuf = self.sendbuf.borrow_mut();
        let mut recvbuf = self.recvbuf.borrow_mut();

        let n_send = {
            let _span = debug_span!("pack", %face).entered();
            store.remove_particles(mask, &mut sendbuf)?
        };

        // Send across the face, receive from across the opposite one
        let send_neighbor = self.neighbors.neighbor_rank(face);
        let recv_neighbor = self.neighbors.neighbor_rank(face.opposite());

        let n_recv = {
            let _span = debug_span!("exchange", %face, send_neighbor, recv_neighbor).entered();

            let count = u32::try_from(n_send).map_err(|_| Error::SendOverflow {
                face,
                count: n_send,
            })?;
            let reply = self.transport.exchange(
                send_neighbor,
                recv_neighbor,
                self.config.tags.size,
                Bytes::copy_from_slice(&count.to_ne_bytes()),
            )?;
            let n_recv = decode_count(&reply).ok_or(Error::MalformedSize {
                peer: recv_neighbor,
                face,
                len: reply.len(),
            })? as usize;

            let payload = {
                let h = sendbuf.try_acquire(AccessLocation::Host, AccessMode::Read)?;
                Bytes::copy_from_slice(h.as_bytes())
            };
            let body = self.transport.exchange(
                send_neighbor,
                recv_neighbor,
                self.config.tags.payload,
                payload,
            )?;

            // Checked before the receive buffer grows to the announced count
            let expected = n_recv.saturating_mul(size_of::<R>());
            if body.len() != expected {
                return Err(Error::PayloadMismatch {
                    peer: recv_neighbor,
                    face,
                    expected,
                    actual: body.len(),
                });
            }
            recvbuf.resize(n_recv);
            let mut h = recvbuf.try_acquire(AccessLocation::Host, AccessMode::Overwrite)?;
            h.as_bytes_mut()?.copy_from_slice(&body);

            trace!(sent = n_send, received = n_recv, "exchanged");
            n_recv
        };

        {
            let _span = debug_span!("wrap", %face).entered();
            let mut h = recvbuf.try_acquire(AccessLocation::Host, AccessMode::ReadWrite)?;
            let mut escaped = 0usize;
            for record in h.iter_mut() {
                let mut pos = record.position();
                let mut image = [0; 3];
                wrap.wrap(&mut pos, &mut image);
                record.set_position(pos);
                if self.config.verify_wrap && !inside_periodic(wrap, pos) {
                    escaped += 1;
                }
            }
            if escaped > 0 {
                warn!(
                    %face,
                    escaped,
                    peer = recv_neighbor,
                    "received particles outside the wrap box; displacement exceeded one subdomain"
                );
            }
        }

        {
            let _span = debug_span!("unpack", %face).entered();
            let h = recvbuf.try_acquire(AccessLocation::Host, AccessMode::Read)?;
            store.add_particles(&h, mask);
        }

        Ok(FaceStats {
            sent: n_send,
            received: n_recv,
        })
    }
}

impl<T, R: ParticleRecord> Drop for Migrator<T, R> {
    fn drop(&mut self) {
        debug!("destroying MPCD communicator");
    }
}

impl<T, R: ParticleRecord> std::fmt::Debug for Migrator<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("state", &self.state.get())
            .field("neighbors", &self.neighbors.len())
            .field("global_box", &self.global_box)
            .field("config", &self.config)
            .finish()
    }
}

fn decode_count(body: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = body.try_into().ok()?;
    Some(u32::from_ne_bytes(bytes))
}

fn inside_periodic(wrap: &BoxDim, pos: [f64; 3]) -> bool {
    let lo = wrap.lo();
    let hi = wrap.hi();
    Axis::ALL
        .iter()
        .filter(|a| wrap.is_periodic(**a))
        .all(|a| pos[a.index()] >= lo[a.index()] && pos[a.index()] < hi[a.index()])
}
