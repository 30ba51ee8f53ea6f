//! # sparklog core
//!
//! Read path for sparklog log files: a resumable cursor over an append-only
//! log of PUT/DELETE entries, and a hash-indexed cursor layered on top.
//!
//! This crate provides:
//! - [`LogReader`]: a shared, immutable handle over one log file
//! - [`LogIterator`]: sequential traversal with chunked key/value reads
//! - [`ChunkReader`]: `std::io::Read` view over the current key or value
//! - [`HashReader`] / [`HashIterator`]: point lookup and live-key traversal
//!
//! ## Example
//!
//! ```rust,ignore
//! let log = LogReader::open(Box::new(FileBackend::open_read_only(path)?))?;
//! let mut iter = log.iter();
//! iter.next()?;
//! while iter.is_valid() {
//!     let key = iter.read_key()?;
//!     let value = iter.read_value()?;
//!     println!("{key:?} => {value:?}");
//!     iter.next()?;
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod format;
mod hash;
mod log;
mod types;

pub use config::ReaderConfig;
pub use error::{CoreError, CoreResult};
pub use format::{encode_entry, EntryHeader, LogHeader, FORMAT_VERSION, LOG_MAGIC};
pub use hash::{HashIterator, HashReader, IndexEntry, KeyIndex, LiveEntries, MemoryHashIndex};
pub use log::{ChunkReader, Entries, LogEntry, LogIterator, LogReader};
pub use types::{EntryType, IteratorState};

#[cfg(test)]
pub(crate) mod test_support;
