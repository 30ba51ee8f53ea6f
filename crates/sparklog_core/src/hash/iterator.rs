//! Point lookup and live-key traversal over a [`LogIterator`].

use crate::error::{CoreError, CoreResult};
use crate::hash::{IndexEntry, KeyIndex};
use crate::log::{materialize, LogEntry, LogIterator};
use crate::types::EntryType;
use bytes::Bytes;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::trace;

/// A [`LogIterator`] extended with hash-index lookups.
///
/// All position lives in the embedded log iterator, which this type derefs
/// to: `read_key`, `read_value`, `next`, `state` and friends are available
/// directly.
///
/// "Not found" is never an error. A [`seek`](Self::seek) that misses leaves
/// the iterator [`IteratorState::Invalid`](crate::IteratorState) without a
/// recorded fault, and the next `seek` can reposition it.
pub struct HashIterator {
    iter: LogIterator,
    index: Arc<dyn KeyIndex>,
}

impl HashIterator {
    pub(crate) fn new(iter: LogIterator, index: Arc<dyn KeyIndex>) -> Self {
        Self { iter, index }
    }

    /// Positions the iterator on the live entry for `key`.
    ///
    /// On a hit the iterator is active on that entry with both read cursors
    /// at zero. When the key is absent, or its most recent entry is a
    /// delete, the iterator becomes invalid and `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// - [`CoreError::IteratorFaulted`] if the iterator faulted earlier
    /// - [`CoreError::IteratorInactive`] if the iterator was released
    /// - [`CoreError::IndexMismatch`] if the index points at another key
    /// - any storage or framing fault at the target offset
    pub fn seek(&mut self, key: &[u8]) -> CoreResult<()> {
        self.iter.check_seekable()?;

        let hit = match self.index.lookup(key) {
            Ok(hit) => hit,
            Err(err) => return Err(self.iter.fail(err)),
        };

        match hit {
            Some(IndexEntry { offset, live: true }) => {
                self.iter.position_at(offset)?;
                if !self.iter.key_equals(key)? {
                    return Err(self.iter.fail(CoreError::IndexMismatch { offset }));
                }
                Ok(())
            }
            Some(IndexEntry { live: false, .. }) | None => {
                trace!(key_len = key.len(), "seek found no live entry");
                self.iter.mark_not_found();
                Ok(())
            }
        }
    }

    /// Returns the live value for `key`, or `None` if the key is absent or
    /// deleted.
    ///
    /// The value is read through the iterator, consuming its value cursor.
    ///
    /// # Errors
    ///
    /// Same as [`seek`](Self::seek), plus faults while reading the value.
    pub fn get(&mut self, key: &[u8]) -> CoreResult<Option<Bytes>> {
        self.seek(key)?;
        if self.iter.is_valid() && self.iter.entry_type() == EntryType::Put {
            self.iter.read_value().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Moves to the next entry that is the live version of its key.
    ///
    /// Entries shadowed by a later entry for the same key, and keys whose
    /// latest entry is a delete, are skipped. End of log and faults behave
    /// exactly like [`LogIterator::next`].
    ///
    /// # Errors
    ///
    /// Same as [`LogIterator::next`], plus index lookup failures.
    pub fn next_live(&mut self) -> CoreResult<()> {
        loop {
            self.iter.next()?;
            if !self.iter.is_valid() || self.is_live_entry()? {
                return Ok(());
            }
            trace!(offset = self.iter.offset(), "skipping shadowed entry");
        }
    }

    /// Turns the iterator into a standard iterator over live entries,
    /// continuing from the current position.
    #[must_use]
    pub fn live_entries(self) -> LiveEntries {
        LiveEntries {
            iter: self,
            done: false,
        }
    }

    /// Gives the embedded log iterator back.
    #[must_use]
    pub fn into_inner(self) -> LogIterator {
        self.iter
    }

    fn is_live_entry(&mut self) -> CoreResult<bool> {
        if self.iter.entry_type() == EntryType::Delete {
            return Ok(false);
        }
        let key = self.iter.peek_key()?;
        match self.index.lookup(&key) {
            Ok(Some(hit)) => Ok(hit.live && hit.offset == self.iter.offset()),
            Ok(None) => Ok(false),
            Err(err) => Err(self.iter.fail(err)),
        }
    }
}

impl Deref for HashIterator {
    type Target = LogIterator;

    fn deref(&self) -> &LogIterator {
        &self.iter
    }
}

impl DerefMut for HashIterator {
    fn deref_mut(&mut self) -> &mut LogIterator {
        &mut self.iter
    }
}

impl fmt::Debug for HashIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashIterator")
            .field("iter", &self.iter)
            .field("keys", &self.index.len())
            .finish()
    }
}

/// Standard iterator over live entries, created by
/// [`HashIterator::live_entries`].
#[derive(Debug)]
pub struct LiveEntries {
    iter: HashIterator,
    done: bool,
}

impl Iterator for LiveEntries {
    type Item = CoreResult<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = self.iter.next_live().and_then(|()| {
            if self.iter.is_valid() {
                materialize(&mut self.iter).map(Some)
            } else {
                Ok(None)
            }
        });

        match step {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashReader, MemoryHashIndex};
    use crate::test_support::{default_log, open_log, very_long_value};
    use crate::types::IteratorState;

    fn kv(iter: &mut HashIterator) -> String {
        let key = iter.read_key().unwrap_or_default();
        let value = iter.read_value().unwrap_or_default();
        format!(
            "{}:{}",
            String::from_utf8_lossy(&key),
            String::from_utf8_lossy(&value)
        )
    }

    fn reader() -> HashReader {
        HashReader::open(default_log()).unwrap()
    }

    /// Index that answers every lookup with one fixed entry.
    struct FixedIndex(Option<IndexEntry>);

    impl KeyIndex for FixedIndex {
        fn lookup(&self, _key: &[u8]) -> CoreResult<Option<IndexEntry>> {
            Ok(self.0)
        }
        fn len(&self) -> usize {
            1
        }
        fn live_len(&self) -> usize {
            1
        }
    }

    /// Index whose storage is gone.
    struct BrokenIndex;

    impl KeyIndex for BrokenIndex {
        fn lookup(&self, _key: &[u8]) -> CoreResult<Option<IndexEntry>> {
            Err(CoreError::invalid_format("index file unreadable"))
        }
        fn len(&self) -> usize {
            0
        }
        fn live_len(&self) -> usize {
            0
        }
    }

    #[test]
    fn iterate_live_keys() {
        let mut iter = reader().iter();
        let mut contents = Vec::new();

        iter.next_live().unwrap();
        while iter.is_valid() {
            contents.push(kv(&mut iter));
            iter.next_live().unwrap();
        }

        let long = String::from_utf8(very_long_value()).unwrap();
        assert_eq!(contents, vec!["xk:short".to_string(), format!("zk:{long}")]);
        assert_eq!(iter.state(), IteratorState::Closed);
        assert!(iter.fault().is_none());
    }

    #[test]
    fn next_live_skips_shadowed_versions() {
        let log = open_log(&[
            (EntryType::Put, b"a", b"1"),
            (EntryType::Put, b"b", b"1"),
            (EntryType::Put, b"a", b"2"),
            (EntryType::Delete, b"b", b""),
            (EntryType::Put, b"c", b"1"),
            (EntryType::Put, b"a", b"3"),
        ]);
        let reader = HashReader::open(log).unwrap();

        let live: Vec<_> = reader
            .iter()
            .live_entries()
            .map(|e| {
                let e = e.unwrap();
                (e.key, e.value)
            })
            .collect();
        assert_eq!(live, vec![(Bytes::from("c"), Bytes::from("1")), (Bytes::from("a"), Bytes::from("3"))]);
    }

    #[test]
    fn seek_keys() {
        let mut iter = reader().iter();

        iter.seek(b"missing").unwrap();
        assert_eq!(iter.state(), IteratorState::Invalid);
        assert!(iter.fault().is_none());

        iter.seek(b"yk").unwrap();
        assert_eq!(iter.state(), IteratorState::Invalid);

        iter.seek(b"zk").unwrap();
        assert_eq!(iter.state(), IteratorState::Active);
        let long = String::from_utf8(very_long_value()).unwrap();
        assert_eq!(kv(&mut iter), format!("zk:{long}"));

        iter.seek(b"xk").unwrap();
        assert_eq!(iter.state(), IteratorState::Active);
        assert_eq!(kv(&mut iter), "xk:short");
    }

    #[test]
    fn seek_then_next_continues_in_log_order() {
        let mut iter = reader().iter();
        iter.seek(b"zk").unwrap();
        iter.next().unwrap();

        assert_eq!(iter.entry_type(), EntryType::Delete);
        assert_eq!(kv(&mut iter), "yk:");
    }

    #[test]
    fn next_after_missed_seek_is_noop() {
        let mut iter = reader().iter();
        iter.seek(b"missing").unwrap();
        iter.next().unwrap();
        assert_eq!(iter.state(), IteratorState::Invalid);
    }

    #[test]
    fn seek_after_end_of_log() {
        let mut iter = reader().iter();
        iter.skip(10).unwrap();
        assert_eq!(iter.state(), IteratorState::Closed);

        iter.seek(b"xk").unwrap();
        assert_eq!(kv(&mut iter), "xk:short");
    }

    #[test]
    fn retrieve_values() {
        let mut iter = reader().iter();

        assert!(iter.get(b"missing").unwrap().is_none());
        assert!(iter.get(b"x").unwrap().is_none());
        assert_eq!(iter.get(b"zk").unwrap().unwrap(), very_long_value());
        assert_eq!(iter.get(b"xk").unwrap().unwrap(), "short");
        assert!(iter.get(b"yk").unwrap().is_none());
    }

    #[test]
    fn get_defers_to_entry_type() {
        let log = default_log();
        let delete_offset = {
            let mut iter = log.iter();
            iter.skip(4).unwrap();
            iter.offset()
        };
        let index = FixedIndex(Some(IndexEntry {
            offset: delete_offset,
            live: true,
        }));
        let mut iter = HashReader::with_index(log, Arc::new(index)).iter();

        assert!(iter.get(b"yk").unwrap().is_none());
        assert_eq!(iter.state(), IteratorState::Active);
        assert_eq!(iter.entry_type(), EntryType::Delete);
    }

    #[test]
    fn index_pointing_at_other_key_faults() {
        let log = default_log();
        let index = FixedIndex(Some(IndexEntry {
            offset: log.data_start(),
            live: true,
        }));
        let mut iter = HashReader::with_index(log, Arc::new(index)).iter();

        assert!(matches!(
            iter.seek(b"zk"),
            Err(CoreError::IndexMismatch { .. })
        ));
        assert_eq!(iter.state(), IteratorState::Invalid);
        assert!(matches!(
            iter.seek(b"xk"),
            Err(CoreError::IteratorFaulted { .. })
        ));
    }

    #[test]
    fn index_pointing_past_end_faults() {
        let log = default_log();
        let index = FixedIndex(Some(IndexEntry {
            offset: log.end_offset(),
            live: true,
        }));
        let mut iter = HashReader::with_index(log, Arc::new(index)).iter();

        assert!(iter.seek(b"xk").unwrap_err().is_fault());
        assert_eq!(iter.state(), IteratorState::Invalid);
    }

    #[test]
    fn broken_index_faults_iterator() {
        let mut iter = HashReader::with_index(default_log(), Arc::new(BrokenIndex)).iter();

        assert!(iter.get(b"xk").is_err());
        assert_eq!(iter.state(), IteratorState::Invalid);
        assert!(iter.next_live().is_err());
    }

    #[test]
    fn released_hash_iterator() {
        let mut iter = reader().iter();
        iter.close();
        iter.close();
        assert_eq!(iter.state(), IteratorState::Closed);
        assert!(matches!(
            iter.seek(b"xk"),
            Err(CoreError::IteratorInactive { .. })
        ));
    }

    #[test]
    fn empty_index_has_no_live_entries() {
        let log = open_log(&[]);
        let reader = HashReader::with_index(log, Arc::new(MemoryHashIndex::new()));
        assert_eq!(reader.iter().live_entries().count(), 0);
    }

    #[test]
    fn seek_with_zero_chunk_size() {
        let config = crate::ReaderConfig {
            chunk_size: 0,
            ..crate::ReaderConfig::default()
        };
        let log = crate::LogReader::open_with_config(
            Box::new(sparklog_storage::InMemoryBackend::with_data(
                crate::test_support::log_bytes(&[(EntryType::Put, b"xk", b"short")]),
            )),
            config,
        )
        .unwrap();
        let mut iter = HashReader::open(log).unwrap().iter();

        iter.seek(b"xk").unwrap();
        assert_eq!(iter.state(), IteratorState::Active);
        assert_eq!(kv(&mut iter), "xk:short");
    }
}
