//! Growable buffer of fixed-size records with scoped acquisition.
//!
//! Access to the contents goes through an [`ArrayHandle`] obtained from
//! [`ManagedBuffer::acquire`]. At most one handle may be alive per buffer,
//! whatever its mode; the handle releases the buffer when dropped.
//!
//! Resizing and swapping take `&mut self`, so the borrow checker already
//! rules them out while a handle (which borrows `&self`) is alive.

use std::any::type_name;
use std::cell::{Cell, RefCell, RefMut};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::trace;

use crate::{AccessLocation, AccessMode, BufferError, DeviceSync, HostOnly, Result};

/// Contiguous, resizable array of `T` usable from host and device.
pub struct ManagedBuffer<T: Pod> {
    data: RefCell<Vec<T>>,
    len: usize,
    acquired: Cell<bool>,
    residency: Arc<dyn DeviceSync>,
}

impl<T: Pod> ManagedBuffer<T> {
    /// Empty host-only buffer.
    pub fn new() -> Self {
        Self::with_residency(Arc::new(HostOnly))
    }

    /// Empty buffer whose memory follows `residency`.
    pub fn with_residency(residency: Arc<dyn DeviceSync>) -> Self {
        Self {
            data: RefCell::new(Vec::new()),
            len: 0,
            acquired: Cell::new(false),
            residency,
        }
    }

    /// Host-only buffer holding `records`.
    pub fn from_vec(records: Vec<T>) -> Self {
        let len = records.len();
        Self {
            data: RefCell::new(records),
            len,
            acquired: Cell::new(false),
            residency: Arc::new(HostOnly),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the contents in bytes.
    pub fn size_bytes(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }

    /// Whether a handle is currently alive.
    pub fn is_acquired(&self) -> bool {
        self.acquired.get()
    }

    pub fn supports_device_residency(&self) -> bool {
        self.residency.supports_device_residency()
    }

    /// Acquire the contents, panicking if a handle is already alive.
    ///
    /// A double acquisition is a scoping bug in the caller and is not
    /// recoverable.
    pub fn acquire(&self, location: AccessLocation, mode: AccessMode) -> ArrayHandle<'_, T> {
        match self.try_acquire(location, mode) {
            Ok(handle) => handle,
            Err(e) => panic!("{} ({} elements of {})", e, self.len, type_name::<T>()),
        }
    }

    /// Acquire the contents, or report that a handle is already alive.
    ///
    /// Host access to device-resident memory first waits for outstanding
    /// device work.
    pub fn try_acquire(
        &self,
        location: AccessLocation,
        mode: AccessMode,
    ) -> Result<ArrayHandle<'_, T>> {
        if self.acquired.get() {
            return Err(BufferError::AlreadyAcquired);
        }
        if location == AccessLocation::Host && self.residency.supports_device_residency() {
            self.residency.synchronize();
        }
        let data = self
            .data
            .try_borrow_mut()
            .map_err(|_| BufferError::AlreadyAcquired)?;
        self.acquired.set(true);

        Ok(ArrayHandle {
            data,
            acquired: &self.acquired,
            location,
            mode,
        })
    }

    /// Resize to exactly `num_elements` records.
    ///
    /// The first `min(old, new)` records are preserved; new records are
    /// zeroed. Capacity is retained across shrinks so that a buffer reused
    /// every step settles at its high-water mark.
    pub fn resize(&mut self, num_elements: usize) {
        if self.residency.supports_device_residency() {
            self.residency.synchronize();
        }
        let data = self.data.get_mut();
        let old_capacity = data.capacity();
        data.resize(num_elements, T::zeroed());
        self.len = num_elements;

        if data.capacity() != old_capacity {
            trace!(
                elements = data.capacity(),
                bytes = data.capacity() * std::mem::size_of::<T>(),
                ty = type_name::<T>(),
                "managed buffer reallocated"
            );
        }
    }

    /// Exchange contents and residency with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self.data.get_mut(), other.data.get_mut());
        std::mem::swap(&mut self.len, &mut other.len);
        std::mem::swap(&mut self.residency, &mut other.residency);
    }

    /// Drop all records, keeping the allocation.
    pub fn clear(&mut self) {
        self.resize(0);
    }
}

impl<T: Pod> Default for ManagedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod> std::fmt::Debug for ManagedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedBuffer")
            .field("type", &type_name::<T>())
            .field("len", &self.len)
            .field("acquired", &self.acquired.get())
            .field("residency", &self.residency)
            .finish()
    }
}

/// Scoped access to a [`ManagedBuffer`]. Releases the buffer on drop.
pub struct ArrayHandle<'a, T: Pod> {
    data: RefMut<'a, Vec<T>>,
    acquired: &'a Cell<bool>,
    location: AccessLocation,
    mode: AccessMode,
}

impl<'a, T: Pod> ArrayHandle<'a, T> {
    pub fn location(&self) -> AccessLocation {
        self.location
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Records as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.data.as_slice())
    }

    /// Records as mutable raw bytes.
    pub fn as_bytes_mut(&mut self) -> Result<&mut [u8]> {
        if !self.mode.is_writable() {
            return Err(BufferError::ReadOnly);
        }
        Ok(bytemuck::cast_slice_mut(self.data.as_mut_slice()))
    }
}

impl<T: Pod> Deref for ArrayHandle<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.data.as_slice()
    }
}

impl<T: Pod> DerefMut for ArrayHandle<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        assert!(self.mode.is_writable(), "{}", BufferError::ReadOnly);
        self.data.as_mut_slice()
    }
}

impl<T: Pod> Drop for ArrayHandle<'_, T> {
    fn drop(&mut self) {
        self.acquired.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingDevice {
        syncs: AtomicUsize,
    }

    impl DeviceSync for CountingDevice {
        fn supports_device_residency(&self) -> bool {
            true
        }

        fn synchronize(&self) {
            self.syncs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn acquire_then_release() {
        let buf = ManagedBuffer::from_vec(vec![1u32, 2, 3]);
        {
            let h = buf.acquire(AccessLocation::Host, AccessMode::Read);
            assert!(buf.is_acquired());
            assert_eq!(&*h, &[1, 2, 3]);
        }
        assert!(!buf.is_acquired());
        let h = buf.acquire(AccessLocation::Host, AccessMode::ReadWrite);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn second_acquire_is_rejected() {
        let buf = ManagedBuffer::from_vec(vec![0u64; 4]);
        let _h = buf.acquire(AccessLocation::Host, AccessMode::Read);
        assert_eq!(
            buf.try_acquire(AccessLocation::Host, AccessMode::Read).err(),
            Some(BufferError::AlreadyAcquired)
        );
    }

    #[test]
    #[should_panic(expected = "already acquired")]
    fn second_acquire_panics() {
        let buf = ManagedBuffer::from_vec(vec![0u8; 4]);
        let _a = buf.acquire(AccessLocation::Host, AccessMode::Overwrite);
        let _b = buf.acquire(AccessLocation::Device, AccessMode::Read);
    }

    #[test]
    fn resize_preserves_prefix() {
        let mut buf = ManagedBuffer::from_vec(vec![7u32, 8, 9]);
        buf.resize(5);
        assert_eq!(buf.len(), 5);
        assert_eq!(&*buf.acquire(AccessLocation::Host, AccessMode::Read), &[7, 8, 9, 0, 0]);

        buf.resize(2);
        assert_eq!(buf.size_bytes(), 8);
        assert_eq!(&*buf.acquire(AccessLocation::Host, AccessMode::Read), &[7, 8]);

        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn writes_are_visible_after_release() {
        let mut buf = ManagedBuffer::<u32>::new();
        buf.resize(3);
        {
            let mut h = buf.acquire(AccessLocation::Host, AccessMode::Overwrite);
            h.copy_from_slice(&[4, 5, 6]);
        }
        {
            let mut h = buf.acquire(AccessLocation::Host, AccessMode::ReadWrite);
            h.as_bytes_mut().unwrap()[0] = 0xff;
        }
        let h = buf.acquire(AccessLocation::Host, AccessMode::Read);
        assert_eq!(h.as_bytes()[0], 0xff);
        assert_eq!(&h[1..], &[5, 6]);
    }

    #[test]
    fn read_handle_is_read_only() {
        let buf = ManagedBuffer::from_vec(vec![1u16]);
        let mut h = buf.acquire(AccessLocation::Host, AccessMode::Read);
        assert_eq!(h.as_bytes().len(), 2);
        assert_eq!(h.as_bytes_mut().err(), Some(BufferError::ReadOnly));
    }

    #[test]
    #[should_panic(expected = "read-only")]
    fn read_handle_deref_mut_panics() {
        let buf = ManagedBuffer::from_vec(vec![1u16]);
        let mut h = buf.acquire(AccessLocation::Host, AccessMode::Read);
        h[0] = 2;
    }

    #[test]
    fn host_access_synchronizes_device_memory() {
        let device = Arc::new(CountingDevice::default());
        let buf = ManagedBuffer::<f64>::with_residency(device.clone());
        assert!(buf.supports_device_residency());

        drop(buf.acquire(AccessLocation::Device, AccessMode::Read));
        assert_eq!(device.syncs.load(Ordering::SeqCst), 0);

        drop(buf.acquire(AccessLocation::Host, AccessMode::Read));
        assert_eq!(device.syncs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn host_only_never_synchronizes() {
        let buf = ManagedBuffer::<f64>::new();
        assert!(!buf.supports_device_residency());
        drop(buf.acquire(AccessLocation::Host, AccessMode::Read));
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = ManagedBuffer::from_vec(vec![1u32]);
        let mut b = ManagedBuffer::from_vec(vec![2u32, 3]);
        a.swap(&mut b);
        assert_eq!(a.len(), 2);
        assert_eq!(&*b.acquire(AccessLocation::Host, AccessMode::Read), &[1]);
    }
}
