//! Fixed-layout particle records sent between ranks.
//!
//! Records travel as raw bytes with no framing or versioning, so every rank
//! must run a build with the same record layout.

use bytemuck::{Pod, Zeroable};

use crate::Scalar3;

/// A particle as it travels on the wire.
pub trait ParticleRecord: Pod {
    fn position(&self) -> Scalar3;

    fn set_position(&mut self, pos: Scalar3);
}

/// Default MPCD solvent particle record.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Particle {
    pub pos: Scalar3,
    pub vel: Scalar3,
    /// Particle type index.
    pub type_id: u32,
    /// Global particle tag, unique across all ranks.
    pub tag: u32,
}

impl Particle {
    pub const fn new(tag: u32, pos: Scalar3, vel: Scalar3) -> Self {
        Self {
            pos,
            vel,
            type_id: 0,
            tag,
        }
    }

    #[must_use]
    pub const fn with_type(mut self, type_id: u32) -> Self {
        self.type_id = type_id;
        self
    }
}

impl ParticleRecord for Particle {
    fn position(&self) -> Scalar3 {
        self.pos
    }

    fn set_position(&mut self, pos: Scalar3) {
        self.pos = pos;
    }
}

// 6 scalars + 2 ids, no padding
const _: () = assert!(std::mem::size_of::<Particle>() == 56);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_bytes_roundtrip() {
        let p = Particle::new(42, [1.0, -2.0, 3.5], [0.1, 0.2, 0.3]).with_type(2);
        let bytes = bytemuck::bytes_of(&p);
        assert_eq!(bytes.len(), 56);

        let back: Particle = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, p);
    }

    #[test]
    fn test_set_position() {
        let mut p = Particle::new(0, [0.0; 3], [0.0; 3]);
        p.set_position([1.0, 2.0, 3.0]);
        assert_eq!(p.position(), [1.0, 2.0, 3.0]);
    }
}
