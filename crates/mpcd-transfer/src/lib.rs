//! MPCD Transfer - tagged point-to-point messaging between ranks
//!
//! This crate provides:
//! - A [`Transport`] trait modelled on non-blocking send/receive requests
//! - An in-process [`LocalFabric`] that runs each rank on its own thread
//! - Per-endpoint [`TransferStats`]
//!
//! # Wire Model
//!
//! Messages are opaque byte bodies tagged with a small integer. A receive
//! posted for `(source, tag)` only completes with a message carrying exactly
//! that source and tag, and messages between one pair with one tag are never
//! reordered. Callers that interleave different message kinds with the same
//! peer give each kind its own tag.
//!
//! There is no timeout or retry at this layer: a peer that never sends hangs
//! the receiver, unless the fabric was configured with a receive timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use mpcd_transfer::{LocalFabric, LocalFabricConfig, Transport};
//!
//! let endpoints = LocalFabric::build(2, LocalFabricConfig::default())?;
//! for t in endpoints {
//!     std::thread::spawn(move || {
//!         let peer = 1 - t.rank();
//!         let reply = t.exchange(peer, peer, 0, bytes::Bytes::from_static(b"hi"))?;
//!         Ok::<_, mpcd_transfer::TransportError>(reply)
//!     });
//! }
//! ```

pub mod error;
pub mod local;
pub mod stats;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use error::{Result, TransportError};
pub use local::{LocalFabric, LocalFabricConfig, LocalRecv, LocalTransport};
pub use stats::{TransferCounters, TransferStats};
pub use transport::{Completed, Request, Transport};
pub use types::{Envelope, Rank, Tag};
