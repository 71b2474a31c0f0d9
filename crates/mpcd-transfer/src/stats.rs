//! Transfer accounting for an endpoint

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated as messages move through an endpoint
#[derive(Debug, Default)]
pub struct TransferCounters {
    messages_sent: AtomicU64,
    bytes_sent: AtomicU64,
    messages_received: AtomicU64,
    bytes_received: AtomicU64,
    /// Messages that arrived before a matching receive was waited on
    deferred: AtomicU64,
}

impl TransferCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outgoing message
    pub fn on_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a completed receive
    pub fn on_received(&self, bytes: usize) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a message parked for a later receive
    pub fn on_deferred(&self) {
        self.deferred.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the counters
    pub fn stats(&self) -> TransferStats {
        TransferStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            deferred: self.deferred.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of endpoint statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub messages_received: u64,
    pub bytes_received: u64,
    pub deferred: u64,
}
