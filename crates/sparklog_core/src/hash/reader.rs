//! A log paired with its key index.

use crate::error::CoreResult;
use crate::hash::{HashIterator, KeyIndex, MemoryHashIndex};
use crate::log::LogReader;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// A log together with a [`KeyIndex`] over the same log.
///
/// Both halves are shared, read-only handles; any number of
/// [`HashIterator`]s can be created from one reader.
#[derive(Clone)]
pub struct HashReader {
    log: Arc<LogReader>,
    index: Arc<dyn KeyIndex>,
}

impl HashReader {
    /// Pairs `log` with a freshly built [`MemoryHashIndex`].
    ///
    /// # Errors
    ///
    /// Returns the first fault hit while scanning the log.
    pub fn open(log: Arc<LogReader>) -> CoreResult<Self> {
        let index = MemoryHashIndex::build(&log)?;
        Ok(Self::with_index(log, Arc::new(index)))
    }

    /// Pairs `log` with an existing index.
    ///
    /// The index must describe this exact log; lookups that land on an entry
    /// holding another key are reported as
    /// [`CoreError::IndexMismatch`](crate::CoreError).
    #[must_use]
    pub fn with_index(log: Arc<LogReader>, index: Arc<dyn KeyIndex>) -> Self {
        Self { log, index }
    }

    /// Creates a new iterator in the `NEW` state.
    #[must_use]
    pub fn iter(&self) -> HashIterator {
        HashIterator::new(self.log.iter(), Arc::clone(&self.index))
    }

    /// Looks up the live value of `key` with a throwaway iterator.
    ///
    /// # Errors
    ///
    /// See [`HashIterator::get`].
    pub fn get(&self, key: &[u8]) -> CoreResult<Option<Bytes>> {
        self.iter().get(key)
    }

    /// The underlying log.
    #[must_use]
    pub fn log(&self) -> &Arc<LogReader> {
        &self.log
    }

    /// The key index.
    #[must_use]
    pub fn index(&self) -> &Arc<dyn KeyIndex> {
        &self.index
    }
}

impl fmt::Debug for HashReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashReader")
            .field("log", &self.log)
            .field("keys", &self.index.len())
            .field("live", &self.index.live_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{default_log, very_long_value};

    #[test]
    fn get_through_reader() {
        let reader = HashReader::open(default_log()).unwrap();

        assert_eq!(reader.get(b"xk").unwrap().unwrap(), "short");
        assert_eq!(reader.get(b"zk").unwrap().unwrap(), very_long_value());
        assert!(reader.get(b"yk").unwrap().is_none());
        assert!(reader.get(b"nope").unwrap().is_none());
    }

    #[test]
    fn index_stats() {
        let reader = HashReader::open(default_log()).unwrap();
        assert_eq!(reader.index().len(), 3);
        assert_eq!(reader.index().live_len(), 2);
    }
}
