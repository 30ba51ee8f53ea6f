//! Sequential cursor over the entries of one log.

use crate::error::{CoreError, CoreResult};
use crate::format::EntryHeader;
use crate::log::{ChunkReader, Entries, LogReader};
use crate::types::{EntryType, IteratorState};
use bytes::Bytes;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{trace, warn};

/// Which half of the current entry a read consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Key,
    Value,
}

/// A resumable cursor over the entries of a log.
///
/// The iterator starts in [`IteratorState::New`] and is positioned with
/// [`next`](Self::next) or [`skip`](Self::skip). While
/// [`IteratorState::Active`], the key and value of the current entry can be
/// pulled in chunks of any size.
///
/// # Read cursors
///
/// Key and value reads are **one-shot per entry**: every byte is returned by
/// exactly one chunk call. Once a stream is exhausted further reads return an
/// empty chunk. [`reset`](Self::reset) rewinds both cursors to the start of
/// the current entry; moving to another entry resets them as well.
///
/// # Faults
///
/// A storage error or corrupted framing moves the iterator to
/// [`IteratorState::Invalid`] and is remembered: further `next`/`skip` calls
/// fail with [`CoreError::IteratorFaulted`]. Other iterators over the same
/// log are unaffected.
///
/// # Example
///
/// ```rust,ignore
/// let mut iter = log.iter();
/// iter.next()?;
/// while iter.is_valid() {
///     let key = iter.read_key()?;
///     let value = iter.read_value()?;
///     iter.next()?;
/// }
/// ```
#[derive(Debug)]
pub struct LogIterator {
    log: Arc<LogReader>,
    state: IteratorState,
    entry_type: EntryType,
    key_len: u64,
    value_len: u64,
    key_cursor: u64,
    value_cursor: u64,
    /// Start of the current entry's header.
    offset: u64,
    /// Where the following `next` reads its header.
    next_offset: u64,
    fault: Option<String>,
    /// Set by `close`; a released iterator cannot be repositioned.
    released: bool,
}

impl LogIterator {
    pub(crate) fn new(log: Arc<LogReader>) -> Self {
        let start = log.data_start();
        Self {
            log,
            state: IteratorState::New,
            entry_type: EntryType::Delete,
            key_len: 0,
            value_len: 0,
            key_cursor: 0,
            value_cursor: 0,
            offset: start,
            next_offset: start,
            fault: None,
            released: false,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Returns `true` when positioned on an entry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state == IteratorState::Active
    }

    /// Type of the current entry; `Delete` when not positioned.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Key length of the current entry; 0 when not positioned.
    #[must_use]
    pub fn key_len(&self) -> u64 {
        self.key_len
    }

    /// Value length of the current entry; 0 when not positioned.
    #[must_use]
    pub fn value_len(&self) -> u64 {
        self.value_len
    }

    /// Log offset this iterator refers to.
    ///
    /// While active this is the offset of the current entry; after the end of
    /// the log it is the log size.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The fault that invalidated this iterator, if any.
    #[must_use]
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// The log this iterator reads.
    #[must_use]
    pub fn log(&self) -> &Arc<LogReader> {
        &self.log
    }

    /// Moves to the next entry.
    ///
    /// Reaching the end of the log is not an error: the iterator becomes
    /// [`IteratorState::Closed`]. Calling `next` on a closed iterator is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns the fault if the next entry cannot be read, and
    /// [`CoreError::IteratorFaulted`] if the iterator faulted earlier.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> CoreResult<()> {
        match self.state {
            IteratorState::Closed => return Ok(()),
            IteratorState::Invalid => return self.check_fault(),
            IteratorState::New | IteratorState::Active => {}
        }

        let offset = self.next_offset;
        match self.log.entry_at(offset) {
            Ok(Some(header)) => {
                self.land(offset, header);
                Ok(())
            }
            Ok(None) => {
                self.finish();
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Moves forward `count` entries, with the same outcome as calling
    /// [`next`](Self::next) `count` times.
    ///
    /// Only entry headers are read; skipped bodies are never loaded.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Self::next).
    pub fn skip(&mut self, count: usize) -> CoreResult<()> {
        for _ in 0..count {
            self.next()?;
            if !self.is_valid() {
                break;
            }
        }
        Ok(())
    }

    /// Rewinds the key and value cursors to the start of the current entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IteratorInactive`] unless the iterator is active.
    pub fn reset(&mut self) -> CoreResult<()> {
        self.ensure_active()?;
        self.key_cursor = 0;
        self.value_cursor = 0;
        Ok(())
    }

    /// Returns up to `max_len` unread bytes of the current key.
    ///
    /// An exhausted key yields an empty chunk.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IteratorInactive`] unless the iterator is
    /// active, or the fault if the bytes cannot be read.
    pub fn read_key_chunk(&mut self, max_len: usize) -> CoreResult<Bytes> {
        self.read_chunk(Stream::Key, max_len)
    }

    /// Returns the unread remainder of the current key.
    ///
    /// # Errors
    ///
    /// See [`read_key_chunk`](Self::read_key_chunk).
    pub fn read_key(&mut self) -> CoreResult<Bytes> {
        self.read_chunk(Stream::Key, usize::MAX)
    }

    /// Returns up to `max_len` unread bytes of the current value.
    ///
    /// # Errors
    ///
    /// See [`read_key_chunk`](Self::read_key_chunk).
    pub fn read_value_chunk(&mut self, max_len: usize) -> CoreResult<Bytes> {
        self.read_chunk(Stream::Value, max_len)
    }

    /// Returns the unread remainder of the current value.
    ///
    /// # Errors
    ///
    /// See [`read_key_chunk`](Self::read_key_chunk).
    pub fn read_value(&mut self) -> CoreResult<Bytes> {
        self.read_chunk(Stream::Value, usize::MAX)
    }

    /// Compares the current keys of two iterators over the same log.
    ///
    /// Keys are compared byte-lexicographically and streamed in
    /// [`ReaderConfig::chunk_size`](crate::ReaderConfig) pieces; neither
    /// iterator's cursors move.
    ///
    /// # Errors
    ///
    /// - [`CoreError::LogMismatch`] if the iterators read different logs
    /// - [`CoreError::IteratorInactive`] if either iterator is not active
    /// - [`CoreError::KeyPartiallyConsumed`] if either key was already read
    ///   from; comparison only runs on clean positions
    pub fn compare(&mut self, other: &mut LogIterator) -> CoreResult<Ordering> {
        if !Arc::ptr_eq(&self.log, &other.log) {
            return Err(CoreError::LogMismatch);
        }
        self.ensure_active()?;
        other.ensure_active()?;
        if self.key_cursor != 0 || other.key_cursor != 0 {
            return Err(CoreError::KeyPartiallyConsumed);
        }

        let chunk = self.log.config().chunk_size as u64;
        let common = self.key_len.min(other.key_len);
        let mut pos = 0;
        while pos < common {
            let n = (common - pos).min(chunk) as usize;
            let ours = self.peek(self.key_start() + pos, n)?;
            let theirs = other.peek(other.key_start() + pos, n)?;
            match ours.cmp(&theirs) {
                Ordering::Equal => pos += n as u64,
                ord => return Ok(ord),
            }
        }
        Ok(self.key_len.cmp(&other.key_len))
    }

    /// Streaming view over the current key, sharing this iterator's cursor.
    pub fn key_reader(&mut self) -> ChunkReader<'_> {
        ChunkReader::new(self, Stream::Key)
    }

    /// Streaming view over the current value, sharing this iterator's cursor.
    pub fn value_reader(&mut self) -> ChunkReader<'_> {
        ChunkReader::new(self, Stream::Value)
    }

    /// Turns the iterator into a standard iterator over whole entries,
    /// continuing from the current position.
    #[must_use]
    pub fn entries(self) -> Entries {
        Entries::new(self)
    }

    /// Releases the iterator.
    ///
    /// The iterator becomes [`IteratorState::Closed`]. Releasing is
    /// idempotent and never touches the log or other iterators.
    pub fn close(&mut self) {
        if self.state != IteratorState::Closed {
            trace!(offset = self.offset, "iterator released");
        }
        self.state = IteratorState::Closed;
        self.released = true;
        self.clear_entry();
    }

    /// Repositions onto the entry at `offset`, as a fresh entry.
    pub(crate) fn position_at(&mut self, offset: u64) -> CoreResult<()> {
        self.check_seekable()?;
        match self.log.entry_at(offset) {
            Ok(Some(header)) => {
                self.land(offset, header);
                Ok(())
            }
            Ok(None) => Err(self.fail(CoreError::IndexMismatch { offset })),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Marks a lookup that found nothing: `Invalid`, without a fault.
    pub(crate) fn mark_not_found(&mut self) {
        self.state = IteratorState::Invalid;
        self.clear_entry();
    }

    /// Reads the whole current key without moving the key cursor.
    pub(crate) fn peek_key(&mut self) -> CoreResult<Vec<u8>> {
        self.ensure_active()?;
        let len = usize::try_from(self.key_len).unwrap_or(usize::MAX);
        self.peek(self.key_start(), len)
    }

    /// Checks whether the current key equals `key` without moving the cursor.
    pub(crate) fn key_equals(&mut self, key: &[u8]) -> CoreResult<bool> {
        self.ensure_active()?;
        if self.key_len != key.len() as u64 {
            return Ok(false);
        }
        let chunk = self.log.config().chunk_size;
        for (i, expected) in key.chunks(chunk).enumerate() {
            let start = self.key_start() + (i * chunk) as u64;
            if self.peek(start, expected.len())? != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn read_chunk(&mut self, stream: Stream, max_len: usize) -> CoreResult<Bytes> {
        self.ensure_active()?;

        let cursor = match stream {
            Stream::Key => self.key_cursor,
            Stream::Value => self.value_cursor,
        };
        let n = self.remaining(stream).min(max_len as u64);
        if n == 0 {
            return Ok(Bytes::new());
        }

        let start = self.stream_start(stream) + cursor;
        let data = self.peek(start, n as usize)?;
        match stream {
            Stream::Key => self.key_cursor += n,
            Stream::Value => self.value_cursor += n,
        }
        Ok(Bytes::from(data))
    }

    /// Unread bytes left in `stream`; 0 when not positioned.
    pub(crate) fn remaining(&self, stream: Stream) -> u64 {
        match stream {
            Stream::Key => self.key_len - self.key_cursor,
            Stream::Value => self.value_len - self.value_cursor,
        }
    }

    pub(crate) fn ensure_active(&self) -> CoreResult<()> {
        match self.state {
            IteratorState::Active => Ok(()),
            state @ (IteratorState::New | IteratorState::Closed | IteratorState::Invalid) => {
                Err(CoreError::IteratorInactive { state })
            }
        }
    }

    pub(crate) fn check_fault(&self) -> CoreResult<()> {
        match &self.fault {
            Some(reason) => Err(CoreError::IteratorFaulted {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Fails unless the iterator can still be repositioned.
    pub(crate) fn check_seekable(&self) -> CoreResult<()> {
        self.check_fault()?;
        if self.released {
            return Err(CoreError::IteratorInactive {
                state: IteratorState::Closed,
            });
        }
        Ok(())
    }

    /// Records `err`, invalidates the iterator and hands the error back.
    pub(crate) fn fail(&mut self, err: CoreError) -> CoreError {
        warn!(offset = self.offset, error = %err, "iterator faulted");
        self.state = IteratorState::Invalid;
        self.clear_entry();
        self.fault = Some(err.to_string());
        err
    }

    fn peek(&mut self, offset: u64, len: usize) -> CoreResult<Vec<u8>> {
        match self.log.read_bytes(offset, len) {
            Ok(data) => Ok(data),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn key_start(&self) -> u64 {
        self.offset + EntryHeader::SIZE as u64
    }

    fn stream_start(&self, stream: Stream) -> u64 {
        match stream {
            Stream::Key => self.key_start(),
            Stream::Value => self.key_start() + self.key_len,
        }
    }

    fn land(&mut self, offset: u64, header: EntryHeader) {
        self.state = IteratorState::Active;
        self.entry_type = header.entry_type;
        self.key_len = u64::from(header.key_len);
        self.value_len = header.value_len;
        self.key_cursor = 0;
        self.value_cursor = 0;
        self.offset = offset;
        self.next_offset = offset + EntryHeader::SIZE as u64 + self.key_len + self.value_len;
        trace!(
            offset,
            entry_type = %self.entry_type,
            key_len = self.key_len,
            value_len = self.value_len,
            "positioned on entry"
        );
    }

    fn finish(&mut self) {
        self.state = IteratorState::Closed;
        self.clear_entry();
        self.offset = self.log.end_offset();
        self.next_offset = self.offset;
        trace!(offset = self.offset, "reached end of log");
    }

    fn clear_entry(&mut self) {
        self.entry_type = EntryType::Delete;
        self.key_len = 0;
        self.value_len = 0;
        self.key_cursor = 0;
        self.value_cursor = 0;
    }
}
