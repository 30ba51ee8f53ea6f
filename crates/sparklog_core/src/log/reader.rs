//! The shared log handle.

use crate::config::ReaderConfig;
use crate::error::{CoreError, CoreResult};
use crate::format::{EntryHeader, LogHeader};
use crate::log::LogIterator;
use sparklog_storage::StorageBackend;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An open, immutable log.
///
/// The storage size is captured when the log is opened; entries appended to
/// the backend afterwards are not visible through this handle.
///
/// # Example
///
/// ```rust,ignore
/// let log = LogReader::open(Box::new(FileBackend::open_read_only(path)?))?;
/// let mut a = log.iter();
/// let mut b = log.iter();   // independent position
/// ```
pub struct LogReader {
    backend: Box<dyn StorageBackend>,
    config: ReaderConfig,
    header: LogHeader,
    size: u64,
}

impl LogReader {
    /// Opens a log with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file header is missing or invalid, or the
    /// backend cannot be read.
    pub fn open(backend: Box<dyn StorageBackend>) -> CoreResult<Arc<Self>> {
        Self::open_with_config(backend, ReaderConfig::default())
    }

    /// Opens a log with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file header is missing or invalid, or the
    /// backend cannot be read.
    pub fn open_with_config(
        backend: Box<dyn StorageBackend>,
        mut config: ReaderConfig,
    ) -> CoreResult<Arc<Self>> {
        // Streaming loops stop on an empty chunk.
        config.chunk_size = config.chunk_size.max(1);

        let size = backend.size()?;
        if size < LogHeader::SIZE as u64 {
            return Err(CoreError::invalid_format(format!(
                "log is {size} bytes, shorter than its header"
            )));
        }
        let header = LogHeader::decode(&backend.read_at(0, LogHeader::SIZE)?)?;
        debug!(size, version = header.version, "opened log");

        Ok(Arc::new(Self {
            backend,
            config,
            header,
            size,
        }))
    }

    /// Creates a new iterator in the `NEW` state.
    #[must_use]
    pub fn iter(self: &Arc<Self>) -> LogIterator {
        LogIterator::new(Arc::clone(self))
    }

    /// Returns the decoded file header.
    #[must_use]
    pub fn header(&self) -> LogHeader {
        self.header
    }

    /// Returns the reader configuration.
    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Offset of the first entry.
    #[must_use]
    pub fn data_start(&self) -> u64 {
        LogHeader::SIZE as u64
    }

    /// Offset one past the last entry (the log size).
    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.size
    }

    /// Reads and validates the entry header at `offset`.
    ///
    /// Returns `Ok(None)` when `offset` is exactly the end of the log.
    pub(crate) fn entry_at(&self, offset: u64) -> CoreResult<Option<EntryHeader>> {
        if offset == self.size {
            return Ok(None);
        }
        if offset > self.size {
            return Err(CoreError::corruption(
                offset,
                format!("entry offset beyond end of log ({})", self.size),
            ));
        }

        let available = self.size - offset;
        if available < EntryHeader::SIZE as u64 {
            return Err(CoreError::Truncated {
                offset,
                needed: EntryHeader::SIZE as u64,
                available,
            });
        }

        let raw = self.backend.read_at(offset, EntryHeader::SIZE)?;
        let header = EntryHeader::decode(&raw, offset, self.config.verify_checksums)?;

        if header.key_len > self.config.max_key_len {
            return Err(CoreError::corruption(
                offset,
                format!(
                    "key length {} exceeds limit {}",
                    header.key_len, self.config.max_key_len
                ),
            ));
        }

        let needed = header
            .total_len()
            .ok_or_else(|| CoreError::corruption(offset, "entry length overflows"))?;
        if needed > available {
            return Err(CoreError::Truncated {
                offset,
                needed,
                available,
            });
        }

        Ok(Some(header))
    }

    /// Reads `len` raw bytes at `offset`.
    pub(crate) fn read_bytes(&self, offset: u64, len: usize) -> CoreResult<Vec<u8>> {
        Ok(self.backend.read_at(offset, len)?)
    }
}

impl fmt::Debug for LogReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogReader")
            .field("header", &self.header)
            .field("size", &self.size)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::encode_entry;
    use crate::test_support::{default_log, log_bytes};
    use crate::types::EntryType;
    use sparklog_storage::InMemoryBackend;

    fn open_raw(bytes: Vec<u8>) -> CoreResult<Arc<LogReader>> {
        LogReader::open(Box::new(InMemoryBackend::with_data(bytes)))
    }

    #[test]
    fn open_empty_log() {
        let log = open_raw(log_bytes(&[])).unwrap();
        assert_eq!(log.data_start(), 8);
        assert_eq!(log.end_offset(), 8);
        assert!(log.entry_at(log.data_start()).unwrap().is_none());
    }

    #[test]
    fn open_rejects_short_file() {
        assert!(matches!(
            open_raw(b"SPL".to_vec()),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn open_rejects_foreign_file() {
        assert!(matches!(
            open_raw(b"NOTALOGFILE".to_vec()),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn entry_at_first_entry() {
        let log = default_log();
        let header = log.entry_at(log.data_start()).unwrap().unwrap();
        assert_eq!(header.entry_type, EntryType::Put);
        assert_eq!(header.key_len, 2);
        assert_eq!(header.value_len, 5);
    }

    #[test]
    fn entry_at_truncated_body() {
        let mut bytes = log_bytes(&[]);
        let entry = encode_entry(EntryType::Put, b"key", b"value").unwrap();
        bytes.extend_from_slice(&entry[..entry.len() - 2]);
        let log = open_raw(bytes).unwrap();

        assert!(matches!(
            log.entry_at(8),
            Err(CoreError::Truncated { offset: 8, .. })
        ));
    }

    #[test]
    fn entry_at_truncated_header() {
        let mut bytes = log_bytes(&[]);
        bytes.extend_from_slice(&[1, 2, 3]);
        let log = open_raw(bytes).unwrap();

        assert!(matches!(
            log.entry_at(8),
            Err(CoreError::Truncated { available: 3, .. })
        ));
    }

    #[test]
    fn entry_at_respects_key_limit() {
        let bytes = log_bytes(&[(EntryType::Put, b"a-long-key", b"")]);
        let log = LogReader::open_with_config(
            Box::new(InMemoryBackend::with_data(bytes)),
            ReaderConfig::new().max_key_len(4),
        )
        .unwrap();

        assert!(matches!(log.entry_at(8), Err(CoreError::Corruption { .. })));
    }

    #[test]
    fn zero_chunk_size_is_raised_on_open() {
        let config = ReaderConfig {
            chunk_size: 0,
            ..ReaderConfig::default()
        };
        let log = LogReader::open_with_config(
            Box::new(InMemoryBackend::with_data(log_bytes(&[
                (EntryType::Put, b"xk", b"short"),
                (EntryType::Put, b"xk", b"other"),
            ]))),
            config,
        )
        .unwrap();
        assert_eq!(log.config().chunk_size, 1);

        let mut a = log.iter();
        let mut b = log.iter();
        a.next().unwrap();
        b.skip(2).unwrap();
        assert_eq!(a.compare(&mut b).unwrap(), std::cmp::Ordering::Equal);

        let mut sink = Vec::new();
        assert_eq!(a.value_reader().drain_to(&mut sink).unwrap(), 5);
        assert_eq!(sink, b"short");
        assert_eq!(a.value_reader().remaining(), 0);
    }
}
