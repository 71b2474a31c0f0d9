//! In-process fabric: every rank is a thread in the same process
//!
//! Provides a [`Transport`] with message-passing semantics for running a
//! whole decomposed simulation inside one process:
//! - one unbounded mailbox per rank, fed by every other rank
//! - sends are buffered and complete immediately
//! - blocking receives run on a small per-endpoint tokio runtime
//! - messages that arrive ahead of their receive are parked until matched

use std::collections::VecDeque;
use std::sync::{Arc, Barrier, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::error::{Result, TransportError};
use crate::stats::{TransferCounters, TransferStats};
use crate::transport::{Completed, Request, Transport};
use crate::types::{Envelope, Rank, Tag};

/// Fabric configuration
#[derive(Debug, Clone, Default)]
pub struct LocalFabricConfig {
    /// Give up on a receive after this long. `None` waits forever.
    pub recv_timeout: Option<Duration>,
}

impl LocalFabricConfig {
    /// Set the receive timeout.
    #[must_use]
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }
}

/// Builder for a set of connected [`LocalTransport`] endpoints
pub struct LocalFabric;

impl LocalFabric {
    /// Create `num_ranks` endpoints, one per rank, all connected to each other.
    ///
    /// Endpoint `i` in the returned vector has rank `i`. Move each one onto
    /// its own thread.
    pub fn build(num_ranks: u32, config: LocalFabricConfig) -> Result<Vec<LocalTransport>> {
        let mut senders = Vec::with_capacity(num_ranks as usize);
        let mut receivers = Vec::with_capacity(num_ranks as usize);
        for _ in 0..num_ranks {
            let (tx, rx) = mpsc::unbounded_channel::<Envelope>();
            senders.push(tx);
            receivers.push(rx);
        }

        let peers = Arc::new(senders);
        let barrier = Arc::new(Barrier::new(num_ranks.max(1) as usize));

        let endpoints = receivers
            .into_iter()
            .enumerate()
            .map(|(rank, rx)| {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()?;
                Ok(LocalTransport {
                    rank: rank as Rank,
                    peers: Arc::clone(&peers),
                    inbox: Mutex::new(Inbox {
                        rx,
                        parked: VecDeque::new(),
                    }),
                    barrier: Arc::clone(&barrier),
                    runtime,
                    recv_timeout: config.recv_timeout,
                    counters: TransferCounters::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Local fabric built with {} ranks", num_ranks);
        Ok(endpoints)
    }
}

struct Inbox {
    rx: mpsc::UnboundedReceiver<Envelope>,
    /// Arrived but not yet matched, in arrival order
    parked: VecDeque<Envelope>,
}

/// One rank's endpoint on a [`LocalFabric`]
pub struct LocalTransport {
    rank: Rank,
    peers: Arc<Vec<mpsc::UnboundedSender<Envelope>>>,
    inbox: Mutex<Inbox>,
    barrier: Arc<Barrier>,
    runtime: Runtime,
    recv_timeout: Option<Duration>,
    counters: TransferCounters,
}

impl LocalTransport {
    /// Snapshot of this endpoint's traffic
    pub fn stats(&self) -> TransferStats {
        self.counters.stats()
    }

    fn check_rank(&self, rank: Rank) -> Result<()> {
        if rank as usize >= self.peers.len() {
            return Err(TransportError::InvalidRank {
                rank,
                num_ranks: self.peers.len() as u32,
            });
        }
        Ok(())
    }

    /// Block until the next message from `src` with `tag` is available.
    fn recv_matching(&self, src: Rank, tag: Tag) -> Result<Bytes> {
        let mut inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(pos) = inbox.parked.iter().position(|e| e.matches(src, tag)) {
            if let Some(env) = inbox.parked.remove(pos) {
                self.counters.on_received(env.len());
                return Ok(env.body);
            }
        }

        let deadline = self
            .recv_timeout
            .map(|t| (tokio::time::Instant::now() + t, t));

        loop {
            let next = match deadline {
                None => self.runtime.block_on(inbox.rx.recv()),
                // The timer must be created inside the runtime
                Some((at, after)) => self
                    .runtime
                    .block_on(async { tokio::time::timeout_at(at, inbox.rx.recv()).await })
                    .map_err(|_| TransportError::Timeout { peer: src, tag, after })?,
            };
            let env = next.ok_or(TransportError::Disconnected { peer: src })?;

            if env.matches(src, tag) {
                self.counters.on_received(env.len());
                return Ok(env.body);
            }
            tracing::trace!(
                "rank {} parked message from {} tag {} while waiting for {} tag {}",
                self.rank,
                env.src,
                env.tag,
                src,
                tag
            );
            self.counters.on_deferred();
            inbox.parked.push_back(env);
        }
    }
}

impl std::fmt::Debug for LocalTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTransport")
            .field("rank", &self.rank)
            .field("num_ranks", &self.peers.len())
            .field("recv_timeout", &self.recv_timeout)
            .finish()
    }
}

/// Pending receive on a [`LocalTransport`]
pub struct LocalRecv<'a> {
    transport: &'a LocalTransport,
    src: Rank,
    tag: Tag,
}

impl Request for LocalRecv<'_> {
    type Output = Bytes;

    fn wait(self) -> Result<Bytes> {
        self.transport.recv_matching(self.src, self.tag)
    }
}

impl Transport for LocalTransport {
    type SendRequest<'a> = Completed;
    type RecvRequest<'a> = LocalRecv<'a>;

    fn rank(&self) -> Rank {
        self.rank
    }

    fn num_ranks(&self) -> u32 {
        self.peers.len() as u32
    }

    fn isend(&self, dest: Rank, tag: Tag, body: Bytes) -> Result<Completed> {
        self.check_rank(dest)?;
        let len = body.len();
        self.peers[dest as usize]
            .send(Envelope::new(self.rank, tag, body))
            .map_err(|_| TransportError::Disconnected { peer: dest })?;
        self.counters.on_sent(len);
        Ok(Completed)
    }

    fn irecv(&self, src: Rank, tag: Tag) -> Result<LocalRecv<'_>> {
        self.check_rank(src)?;
        Ok(LocalRecv {
            transport: self,
            src,
            tag,
        })
    }

    fn barrier(&self) {
        self.barrier.wait();
    }
}
