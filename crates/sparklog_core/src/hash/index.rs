//! Key index trait and the in-memory hash index.

use crate::error::CoreResult;
use crate::log::LogReader;
use crate::types::EntryType;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Where the most recent entry for a key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Offset of the key's most recent entry.
    pub offset: u64,
    /// `true` when that entry is a PUT.
    pub live: bool,
}

/// Read-only mapping from a key to its most recent log entry.
///
/// Implementations must be immutable for as long as any iterator uses them.
pub trait KeyIndex: Send + Sync {
    /// Looks up the most recent entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index itself cannot be read.
    fn lookup(&self, key: &[u8]) -> CoreResult<Option<IndexEntry>>;

    /// Number of distinct keys in the index, live or deleted.
    fn len(&self) -> usize;

    /// Number of keys whose most recent entry is a PUT.
    fn live_len(&self) -> usize;

    /// Returns true if the index holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash index held in memory, derived from one pass over a log.
///
/// # Example
///
/// ```rust,ignore
/// let index = MemoryHashIndex::build(&log)?;
/// if let Some(hit) = index.lookup(b"user:42")? {
///     assert!(hit.live);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MemoryHashIndex {
    entries: HashMap<Vec<u8>, IndexEntry>,
    live: usize,
}

impl MemoryHashIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index by scanning `log` from its first entry.
    ///
    /// # Errors
    ///
    /// Returns the first fault hit while scanning.
    pub fn build(log: &Arc<LogReader>) -> CoreResult<Self> {
        let mut index = Self::new();
        let mut iter = log.iter();
        let mut scanned = 0usize;

        iter.next()?;
        while iter.is_valid() {
            let offset = iter.offset();
            let entry_type = iter.entry_type();
            let key = iter.read_key()?;
            index.record(key.to_vec(), offset, entry_type);
            scanned += 1;
            iter.next()?;
        }

        debug!(
            scanned,
            keys = index.len(),
            live = index.live_len(),
            "built hash index"
        );
        Ok(index)
    }

    /// Records that the entry at `offset` is now the most recent for `key`.
    ///
    /// Entries must be recorded in log order.
    pub fn record(&mut self, key: Vec<u8>, offset: u64, entry_type: EntryType) {
        let live = entry_type == EntryType::Put;
        if let Some(previous) = self.entries.insert(key, IndexEntry { offset, live }) {
            if previous.live {
                self.live -= 1;
            }
        }
        if live {
            self.live += 1;
        }
    }
}

impl KeyIndex for MemoryHashIndex {
    fn lookup(&self, key: &[u8]) -> CoreResult<Option<IndexEntry>> {
        Ok(self.entries.get(key).copied())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn live_len(&self) -> usize {
        self.live
    }
}
