//! Local particle storage as seen by the migrator.

use mpcd_buffer::{AccessLocation, AccessMode, ManagedBuffer};
use mpcd_topology::CommFlags;

use crate::{ParticleRecord, Result, Scalar3};

/// The particles owned by this rank.
pub trait ParticleStore {
    type Record: ParticleRecord;

    /// Number of local particles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of local particle `idx`.
    fn position(&self, idx: usize) -> Scalar3;

    /// Replace the comm flags of every local particle, in index order.
    fn set_comm_flags(&mut self, flags: &[CommFlags]);

    /// Move every particle with a comm flag in `mask` into `out`.
    ///
    /// `out` is resized to exactly the number of removed particles. Returns
    /// that number.
    fn remove_particles(
        &mut self,
        mask: CommFlags,
        out: &mut ManagedBuffer<Self::Record>,
    ) -> Result<usize>;

    /// Append `records`, remembering the face mask they arrived through.
    fn add_particles(&mut self, records: &[Self::Record], origin: CommFlags);
}

/// Vector-backed [`ParticleStore`].
///
/// Removal compacts the survivors in place and keeps their relative order.
/// Added particles start with no comm flags, so they are not sent again
/// until the next classification.
#[derive(Debug, Clone, Default)]
pub struct ParticleData<R> {
    records: Vec<R>,
    comm_flags: Vec<CommFlags>,
    origin: Vec<CommFlags>,
}

impl<R: ParticleRecord> ParticleData<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            comm_flags: Vec::new(),
            origin: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<R>) -> Self {
        let n = records.len();
        Self {
            records,
            comm_flags: vec![0; n],
            origin: vec![0; n],
        }
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
        self.comm_flags.push(0);
        self.origin.push(0);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn comm_flags(&self) -> &[CommFlags] {
        &self.comm_flags
    }

    /// Face mask each particle arrived through, 0 for particles that never
    /// migrated.
    pub fn origin_flags(&self) -> &[CommFlags] {
        &self.origin
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.records.iter()
    }
}

impl<R: ParticleRecord> ParticleStore for ParticleData<R> {
    type Record = R;

    fn len(&self) -> usize {
        self.records.len()
    }

    fn position(&self, idx: usize) -> Scalar3 {
        self.records[idx].position()
    }

    fn set_comm_flags(&mut self, flags: &[CommFlags]) {
        self.comm_flags.clear();
        self.comm_flags.extend_from_slice(flags);
        self.comm_flags.resize(self.records.len(), 0);
    }

    fn remove_particles(&mut self, mask: CommFlags, out: &mut ManagedBuffer<R>) -> Result<usize> {
        let removed = self.comm_flags.iter().filter(|&&f| f & mask != 0).count();
        out.resize(removed);
        if removed == 0 {
            return Ok(0);
        }

        let mut h = out.try_acquire(AccessLocation::Host, AccessMode::Overwrite)?;
        let mut sent = 0;
        let mut kept = 0;
        for i in 0..self.records.len() {
            if self.comm_flags[i] & mask != 0 {
                h[sent] = self.records[i];
                sent += 1;
            } else {
                self.records[kept] = self.records[i];
                self.comm_flags[kept] = self.comm_flags[i];
                self.origin[kept] = self.origin[i];
                kept += 1;
            }
        }
        self.records.truncate(kept);
        self.comm_flags.truncate(kept);
        self.origin.truncate(kept);

        Ok(removed)
    }

    fn add_particles(&mut self, records: &[R], origin: CommFlags) {
        self.records.extend_from_slice(records);
        self.comm_flags.resize(self.records.len(), 0);
        self.origin.resize(self.records.len(), origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Particle;
    use mpcd_topology::Face;

    fn store(n: u32) -> ParticleData<Particle> {
        ParticleData::from_records(
            (0..n)
                .map(|t| Particle::new(t, [t as f64, 0.0, 0.0], [0.0; 3]))
                .collect(),
        )
    }

    fn tags(records: &[Particle]) -> Vec<u32> {
        records.iter().map(|p| p.tag).collect()
    }

    #[test]
    fn remove_compacts_in_order() {
        let mut s = store(6);
        let east = Face::East.mask();
        let up = Face::Up.mask();
        s.set_comm_flags(&[0, east, up, east | up, 0, east]);

        let mut out = ManagedBuffer::new();
        assert_eq!(s.remove_particles(east, &mut out).unwrap(), 3);
        assert_eq!(tags(&out.acquire(AccessLocation::Host, AccessMode::Read)), [1, 3, 5]);
        assert_eq!(tags(s.records()), [0, 2, 4]);
        // Survivors keep their flags for later faces
        assert_eq!(s.comm_flags(), [0, up, 0]);
    }

    #[test]
    fn remove_nothing_empties_buffer() {
        let mut s = store(3);
        s.set_comm_flags(&[0, 0, 0]);
        let mut out = ManagedBuffer::from_vec(vec![Particle::default(); 4]);
        assert_eq!(s.remove_particles(Face::West.mask(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn add_records_provenance() {
        let mut s = store(1);
        s.set_comm_flags(&[Face::North.mask()]);
        s.add_particles(&[Particle::new(9, [0.0; 3], [0.0; 3])], Face::South.mask());

        assert_eq!(s.len(), 2);
        assert_eq!(s.comm_flags(), [Face::North.mask(), 0]);
        assert_eq!(s.origin_flags(), [0, Face::South.mask()]);
        assert_eq!(s.position(1), [0.0; 3]);
    }

    #[test]
    fn short_flag_slice_is_padded() {
        let mut s = store(3);
        s.set_comm_flags(&[Face::Down.mask()]);
        assert_eq!(s.comm_flags(), [Face::Down.mask(), 0, 0]);
    }

    #[test]
    fn remove_releases_buffer() {
        let mut s = store(2);
        s.set_comm_flags(&[Face::East.mask(), 0]);
        let mut out = ManagedBuffer::<Particle>::new();
        assert_eq!(s.remove_particles(Face::East.mask(), &mut out).unwrap(), 1);
        assert!(!out.is_acquired());
        assert_eq!(out.len(), 1);
    }
}
