//! Core type definitions for sparklog.

use std::fmt;

/// Type of a log entry.
///
/// The discriminants are the on-disk type bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    /// A key/value pair.
    Put = 1,
    /// A delete marker for a key. Its value is always empty.
    Delete = 2,
}

impl EntryType {
    /// Converts a byte to an entry type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Put),
            2 => Some(Self::Delete),
            _ => None,
        }
    }

    /// Converts the entry type to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => f.write_str("PUT"),
            Self::Delete => f.write_str("DELETE"),
        }
    }
}

/// Lifecycle state of an iterator.
///
/// ```text
/// NEW ──next/skip──▶ ACTIVE ──next──▶ ACTIVE
///  │                   │
///  └──────next─────────┴──end of log──▶ CLOSED (terminal)
///
/// any ──fault / seek miss──▶ INVALID
/// ```
///
/// `next` and `skip` never leave CLOSED. A hash `seek` may reposition an
/// iterator that ran off the end, but not one released with `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorState {
    /// Created but never positioned.
    New,
    /// Positioned on an entry.
    Active,
    /// Moved past the last entry, or released.
    Closed,
    /// A fault occurred, or a seek did not find its key.
    Invalid,
}

impl fmt::Display for IteratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("NEW"),
            Self::Active => f.write_str("ACTIVE"),
            Self::Closed => f.write_str("CLOSED"),
            Self::Invalid => f.write_str("INVALID"),
        }
    }
}
