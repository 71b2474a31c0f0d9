//! MPCD Managed Buffers
//!
//! Staging storage for particle records on their way between processes.
//!
//! A [`ManagedBuffer`] is a contiguous array of plain-old-data records that
//! can be viewed as raw bytes for transport. Access is scoped: callers
//! [`acquire`](ManagedBuffer::acquire) a handle with an [`AccessLocation`] and
//! [`AccessMode`], and the buffer is released when the handle is dropped.
//! Only one handle may exist at a time.
//!
//! Buffers can be tagged as device-resident through a [`DeviceSync`] hook.
//! Host acquisition of such a buffer first waits for the device.

mod access;
mod buffer;
mod error;
mod residency;

pub use access::{AccessLocation, AccessMode};
pub use buffer::{ArrayHandle, ManagedBuffer};
pub use error::{BufferError, Result};
pub use residency::{DeviceSync, HostOnly};
