//! Access intent for buffer acquisition.

/// Address space the caller wants to touch the data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLocation {
    Host,
    Device,
}

/// What the caller intends to do with the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Contents are read, never written.
    Read,
    /// Contents are read and modified in place.
    ReadWrite,
    /// Contents are fully overwritten; existing values need not be valid.
    Overwrite,
}

impl AccessMode {
    /// Whether a handle with this mode may hand out mutable access.
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Read)
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::ReadWrite => write!(f, "readwrite"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}
