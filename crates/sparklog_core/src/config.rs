//! Reader configuration.

/// Configuration for opening a log.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to verify the CRC of every entry header.
    pub verify_checksums: bool,

    /// Size of the pieces used when a key or value is streamed internally
    /// (key comparison, draining to a sink). Zero is raised to one byte when
    /// the log is opened.
    pub chunk_size: usize,

    /// Largest key length accepted from an entry header. Larger values are
    /// reported as corruption.
    pub max_key_len: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            chunk_size: 64 * 1024,        // 64 KB
            max_key_len: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl ReaderConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether entry header checksums are verified.
    #[must_use]
    pub const fn verify_checksums(mut self, value: bool) -> Self {
        self.verify_checksums = value;
        self
    }

    /// Sets the internal streaming chunk size. Zero is raised to one byte.
    #[must_use]
    pub const fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the largest accepted key length.
    #[must_use]
    pub const fn max_key_len(mut self, len: u32) -> Self {
        self.max_key_len = len;
        self
    }
}
