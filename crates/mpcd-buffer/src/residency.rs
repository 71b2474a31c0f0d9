//! Device residency hook.
//!
//! A buffer backed by memory that an accelerator can also touch must not be
//! read on the host while device work on it is still in flight.

/// Synchronization capability of the memory behind a buffer.
pub trait DeviceSync: Send + Sync + std::fmt::Debug {
    /// Whether the memory can be resident on an accelerator.
    fn supports_device_residency(&self) -> bool;

    /// Block until all outstanding device work has completed.
    fn synchronize(&self);
}

/// Plain host memory. Synchronization is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostOnly;

impl DeviceSync for HostOnly {
    fn supports_device_residency(&self) -> bool {
        false
    }

    fn synchronize(&self) {}
}
