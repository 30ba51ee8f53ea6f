//! Log fixtures.
//!
//! [`LogBuilder`] assembles log bytes entry by entry and remembers where each
//! entry starts; [`TestLog`] opens the result on memory or on a temporary
//! file.

use sparklog_core::{encode_entry, EntryType, LogHeader, LogIterator, LogReader, ReaderConfig};
use sparklog_storage::{FileBackend, InMemoryBackend, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Builds log bytes entry by entry.
#[derive(Debug, Clone)]
pub struct LogBuilder {
    buf: Vec<u8>,
    offsets: Vec<u64>,
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuilder {
    /// Starts a log holding only the file header.
    pub fn new() -> Self {
        Self {
            buf: LogHeader::current().encode().to_vec(),
            offsets: Vec::new(),
        }
    }

    /// Appends a PUT entry.
    #[must_use]
    pub fn put(self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        self.entry(EntryType::Put, key.as_ref(), value.as_ref())
    }

    /// Appends a DELETE entry.
    #[must_use]
    pub fn delete(self, key: impl AsRef<[u8]>) -> Self {
        self.entry(EntryType::Delete, key.as_ref(), &[])
    }

    /// Appends an entry of any type.
    #[must_use]
    pub fn entry(mut self, entry_type: EntryType, key: &[u8], value: &[u8]) -> Self {
        let encoded = encode_entry(entry_type, key, value).expect("Entry too large to encode");
        self.offsets.push(self.buf.len() as u64);
        self.buf.extend(encoded);
        self
    }

    /// Appends raw bytes, for building damaged logs.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Drops the last `n` bytes, leaving a truncated tail.
    #[must_use]
    pub fn truncate_tail(mut self, n: usize) -> Self {
        let len = self.buf.len().saturating_sub(n);
        self.buf.truncate(len);
        self
    }

    /// Start offsets of the entries appended so far.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// The log bytes built so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the builder, returning the log bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Wraps the log bytes in an in-memory backend.
    pub fn into_memory_backend(self) -> InMemoryBackend {
        InMemoryBackend::with_data(self.buf)
    }

    /// Writes the log bytes to `path` through a [`FileBackend`].
    pub fn write_to(&self, path: &Path) {
        let mut backend =
            FileBackend::open_with_create_dirs(path).expect("Failed to create log file");
        backend.append(&self.buf).expect("Failed to write log file");
        backend.flush().expect("Failed to flush log file");
    }

    /// Opens the log on memory with the default configuration.
    pub fn open(self) -> Arc<LogReader> {
        self.open_with_config(ReaderConfig::default())
    }

    /// Opens the log on memory with `config`.
    pub fn open_with_config(self, config: ReaderConfig) -> Arc<LogReader> {
        LogReader::open_with_config(Box::new(self.into_memory_backend()), config)
            .expect("Failed to open log")
    }
}

/// A log opened for a test, kept alive with its backing storage.
pub struct TestLog {
    /// The open log handle.
    pub log: Arc<LogReader>,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestLog {
    /// Opens `builder` on an in-memory backend.
    pub fn memory(builder: LogBuilder) -> Self {
        Self {
            log: builder.open(),
            path: None,
            _temp_dir: None,
        }
    }

    /// Writes `builder` to a temporary file and opens it read-only.
    pub fn file(builder: &LogBuilder) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.splog");
        builder.write_to(&path);

        let backend = FileBackend::open_read_only(&path).expect("Failed to open log file");
        let log = LogReader::open(Box::new(backend)).expect("Failed to open log");

        Self {
            log,
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the log path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl std::ops::Deref for TestLog {
    type Target = Arc<LogReader>;

    fn deref(&self) -> &Self::Target {
        &self.log
    }
}

/// A value long enough to need many chunks: 128 KiB of hex digits.
pub fn very_long_value() -> Vec<u8> {
    b"0123456789abcdef".repeat(8 * 1024)
}

/// The standard log: `xk=short`, `yk=longvalue`, `zk=<very long>`, then a
/// delete of `yk`.
pub fn default_builder() -> LogBuilder {
    LogBuilder::new()
        .put("xk", "short")
        .put("yk", "longvalue")
        .put("zk", very_long_value())
        .delete("yk")
}

/// Opens [`default_builder`] on memory.
pub fn default_log() -> Arc<LogReader> {
    default_builder().open()
}

/// Runs a test against the standard log on memory.
pub fn with_default_log<F, R>(f: F) -> R
where
    F: FnOnce(&Arc<LogReader>) -> R,
{
    f(&default_log())
}

/// Runs a test against the standard log in a temporary file.
pub fn with_default_file_log<F, R>(f: F) -> R
where
    F: FnOnce(&Arc<LogReader>, &Path) -> R,
{
    let test_log = TestLog::file(&default_builder());
    let path = test_log.path().expect("File log should have a path");
    f(&test_log.log, path)
}

/// Reads the rest of the current key and value as `"key:value"`.
///
/// Reads that fail count as empty, so an inactive iterator yields `":"`.
pub fn kv(iter: &mut LogIterator) -> String {
    let key = iter.read_key().unwrap_or_default();
    let value = iter.read_value().unwrap_or_default();
    format!(
        "{}:{}",
        String::from_utf8_lossy(&key),
        String::from_utf8_lossy(&value)
    )
}
