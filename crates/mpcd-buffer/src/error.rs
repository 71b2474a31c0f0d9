//! Error types for mpcd-buffer.

use thiserror::Error;

/// Result type for buffer operations.
pub type Result<T> = std::result::Result<T, BufferError>;

/// Misuse of a [`ManagedBuffer`](crate::ManagedBuffer).
///
/// Both variants are programming errors. The panicking entry points report
/// them with the same message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A second handle was requested while one is still alive.
    #[error("managed buffer already acquired - handle scoping mistake?")]
    AlreadyAcquired,

    /// Mutable access through a handle acquired for reading.
    #[error("write through a read-only buffer handle")]
    ReadOnly,
}
