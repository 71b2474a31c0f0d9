//! Point-to-point transport abstraction
//!
//! Mirrors the non-blocking send/receive model of message-passing libraries:
//! - `isend` / `irecv` post an operation and return a waitable request
//! - receives match on `(source, tag)` and are non-overtaking per pair
//! - `exchange` posts a paired send and receive, then waits on both

use bytes::Bytes;

use crate::error::Result;
use crate::types::{Rank, Tag};

/// A posted operation that can be waited on
pub trait Request {
    /// Value produced on completion
    type Output;

    /// Block until the operation completes
    fn wait(self) -> Result<Self::Output>;
}

/// Tagged point-to-point messaging between ranks
pub trait Transport {
    /// Request returned by [`isend`](Self::isend)
    type SendRequest<'a>: Request<Output = ()>
    where
        Self: 'a;

    /// Request returned by [`irecv`](Self::irecv)
    type RecvRequest<'a>: Request<Output = Bytes>
    where
        Self: 'a;

    /// Rank of this endpoint
    fn rank(&self) -> Rank;

    /// Number of ranks in the communicator
    fn num_ranks(&self) -> u32;

    /// Post a send of `body` to `dest`
    fn isend(&self, dest: Rank, tag: Tag, body: Bytes) -> Result<Self::SendRequest<'_>>;

    /// Post a receive for the next message from `src` with `tag`
    fn irecv(&self, src: Rank, tag: Tag) -> Result<Self::RecvRequest<'_>>;

    /// Block until every rank has reached the barrier
    fn barrier(&self);

    /// Send `body` to `dest` while receiving from `src`, blocking until both
    /// operations have completed.
    fn exchange(&self, dest: Rank, src: Rank, tag: Tag, body: Bytes) -> Result<Bytes> {
        let send = self.isend(dest, tag, body)?;
        let recv = self.irecv(src, tag)?;
        send.wait()?;
        recv.wait()
    }
}

/// A request that completed when it was posted
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;

impl Request for Completed {
    type Output = ();

    fn wait(self) -> Result<()> {
        Ok(())
    }
}
