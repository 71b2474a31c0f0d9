//! Core types for the MPCD transfer layer

use bytes::Bytes;

/// Process rank within the communicator
pub type Rank = u32;

/// Message tag. Receives only match messages carrying the same tag.
pub type Tag = u16;

/// A message in flight between two ranks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Sending rank
    pub src: Rank,
    /// Message tag
    pub tag: Tag,
    /// Message body
    pub body: Bytes,
}

impl Envelope {
    /// Create a new envelope
    pub fn new(src: Rank, tag: Tag, body: Bytes) -> Self {
        Self { src, tag, body }
    }

    /// Whether this envelope satisfies a receive posted for `(src, tag)`
    pub fn matches(&self, src: Rank, tag: Tag) -> bool {
        self.src == src && self.tag == tag
    }

    /// Body length in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_matching() {
        let env = Envelope::new(3, 1, Bytes::from_static(b"abc"));
        assert!(env.matches(3, 1));
        assert!(!env.matches(3, 0));
        assert!(!env.matches(2, 1));
        assert_eq!(env.len(), 3);
    }
}
