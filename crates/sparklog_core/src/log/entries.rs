//! Whole-entry iteration on top of [`LogIterator`].

use crate::error::CoreResult;
use crate::log::LogIterator;
use crate::types::EntryType;
use bytes::Bytes;

/// One fully materialized log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Offset of the entry in the log.
    pub offset: u64,
    /// PUT or DELETE.
    pub entry_type: EntryType,
    /// Full key.
    pub key: Bytes,
    /// Full value; empty for deletes.
    pub value: Bytes,
}

/// Standard iterator over whole entries, created by [`LogIterator::entries`].
///
/// Each item reads the key and value of one entry in full, so this is meant
/// for logs whose values comfortably fit in memory. Iteration ends after the
/// last entry or after the first error.
#[derive(Debug)]
pub struct Entries {
    iter: LogIterator,
    done: bool,
}

impl Entries {
    pub(crate) fn new(iter: LogIterator) -> Self {
        Self { iter, done: false }
    }

    /// Gives the underlying cursor back.
    #[must_use]
    pub fn into_inner(self) -> LogIterator {
        self.iter
    }
}

/// Reads the rest of the current entry of an active iterator.
pub(crate) fn materialize(iter: &mut LogIterator) -> CoreResult<LogEntry> {
    let key = iter.read_key()?;
    let value = iter.read_value()?;
    Ok(LogEntry {
        offset: iter.offset(),
        entry_type: iter.entry_type(),
        key,
        value,
    })
}

impl Iterator for Entries {
    type Item = CoreResult<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = self.iter.next().and_then(|()| {
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
