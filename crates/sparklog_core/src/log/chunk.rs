//! Streaming view over the key or value of the current entry.

use crate::error::CoreResult;
use crate::log::{LogIterator, Stream};
use std::io::{self, Read, Write};

/// A forward-only byte reader over one stream (key or value) of a
/// [`LogIterator`]'s current entry.
///
/// The reader shares the iterator's one-shot cursor: bytes consumed here are
/// gone for [`LogIterator::read_key_chunk`] and vice versa. It is not
/// restartable except through [`LogIterator::reset`].
///
/// Two consumption modes are offered over the same state:
/// - pull: [`std::io::Read`], returning `Ok(0)` once the stream is exhausted
/// - drain: [`drain_to`](Self::drain_to), copying the remainder to a sink
///
/// Reading a non-empty buffer while the iterator is not active fails with an
/// `io::Error` wrapping [`CoreError::IteratorInactive`](crate::CoreError).
/// An empty buffer always succeeds with zero bytes.
pub struct ChunkReader<'a> {
    iter: &'a mut LogIterator,
    stream: Stream,
}

impl<'a> ChunkReader<'a> {
    pub(crate) fn new(iter: &'a mut LogIterator, stream: Stream) -> Self {
        Self { iter, stream }
    }

    /// Unread bytes left in this stream; 0 when the iterator is not active.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.iter.remaining(self.stream)
    }

    /// Copies every remaining byte to `sink`, returning the count copied.
    ///
    /// The copy proceeds in [`ReaderConfig::chunk_size`](crate::ReaderConfig)
    /// pieces, so the stream is never buffered whole.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IteratorInactive`](crate::CoreError) if the
    /// iterator is not active, a storage fault, or the sink's I/O error.
    pub fn drain_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> CoreResult<u64> {
        self.iter.ensure_active()?;

        let chunk_size = self.iter.log().config().chunk_size;
        let mut copied = 0u64;
        loop {
            let chunk = self.iter.read_chunk(self.stream, chunk_size)?;
            if chunk.is_empty() {
                return Ok(copied);
            }
            sink.write_all(&chunk)?;
            copied += chunk.len() as u64;
        }
    }
}

impl Read for ChunkReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let chunk = self.iter.read_chunk(self.stream, buf.len())?;
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}
