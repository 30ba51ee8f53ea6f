//! Error types for sparklog core.

use crate::types::IteratorState;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while reading a log.
///
/// Reaching the end of the log, exhausting a key or value, and looking up a
/// missing key are *not* errors: they are reported through iterator state,
/// empty chunks and `None` respectively.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] sparklog_storage::StorageError),

    /// I/O error while writing to a caller-supplied sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a sparklog log, or uses an unsupported version.
    #[error("invalid log format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// An entry's framing is corrupted.
    #[error("log corruption at offset {offset}: {message}")]
    Corruption {
        /// Offset of the entry.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// An entry header failed checksum verification.
    #[error("checksum mismatch at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Offset of the entry.
        offset: u64,
        /// Stored checksum.
        expected: u32,
        /// Computed checksum.
        actual: u32,
    },

    /// An entry extends past the end of the log.
    #[error("truncated entry at offset {offset}: needs {needed} bytes, {available} available")]
    Truncated {
        /// Offset of the entry.
        offset: u64,
        /// Bytes the entry claims.
        needed: u64,
        /// Bytes left in the log.
        available: u64,
    },

    /// The operation needs an iterator positioned on an entry.
    #[error("iterator is not active (state {state})")]
    IteratorInactive {
        /// State the iterator was in.
        state: IteratorState,
    },

    /// The iterator faulted earlier and refuses to move.
    #[error("iterator faulted: {reason}")]
    IteratorFaulted {
        /// The fault that invalidated the iterator.
        reason: String,
    },

    /// Two iterators over different logs were compared.
    #[error("cannot compare iterators over different logs")]
    LogMismatch,

    /// Keys can only be compared before any of their bytes were read.
    #[error("cannot compare keys: key bytes were already consumed")]
    KeyPartiallyConsumed,

    /// The hash index pointed at an entry holding a different key.
    #[error("hash index points to offset {offset}, which holds a different key")]
    IndexMismatch {
        /// Offset the index returned.
        offset: u64,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    pub fn corruption(offset: u64, message: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            message: message.into(),
        }
    }

    /// Returns `true` for errors caused by the data or the storage rather
    /// than by how the iterator was used.
    ///
    /// Faults raised by the log or its storage move an iterator to
    /// [`IteratorState::Invalid`]. An [`Io`](Self::Io) error from the sink
    /// given to [`ChunkReader::drain_to`](crate::ChunkReader::drain_to)
    /// leaves the iterator active with the written bytes consumed.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        match self {
            Self::Storage(_)
            | Self::Io(_)
            | Self::InvalidFormat { .. }
            | Self::Corruption { .. }
            | Self::ChecksumMismatch { .. }
            | Self::Truncated { .. }
            | Self::IteratorFaulted { .. }
            | Self::IndexMismatch { .. } => true,
            Self::IteratorInactive { .. } | Self::LogMismatch | Self::KeyPartiallyConsumed => {
                false
            }
        }
    }
}

impl From<CoreError> for io::Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}
