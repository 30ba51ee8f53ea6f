//! # sparklog storage
//!
//! Byte-store backends underneath sparklog log files.
//!
//! Backends are **opaque byte stores**: they know nothing about log entries,
//! headers or hash indexes. `sparklog_core` owns every format decision and
//! only asks a backend for bytes at an offset.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and ephemeral logs
//! - [`FileBackend`] - For log files on disk
//!
//! ## Example
//!
//! ```rust
//! use sparklog_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 5).unwrap();
//! assert_eq!(&data, b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
