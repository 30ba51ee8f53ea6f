//! Sequential access to a log file.
//!
//! A [`LogReader`] is the shared handle over one log; every [`LogIterator`]
//! holds an `Arc` to it, so the handle outlives all of its iterators.
//! Iterators keep their own position and read cursors and never interfere
//! with each other.

mod chunk;
mod entries;
mod iterator;
mod reader;

pub use chunk::ChunkReader;
pub use entries::{Entries, LogEntry};
pub use iterator::LogIterator;
pub use reader::LogReader;

pub(crate) use entries::materialize;
pub(crate) use iterator::Stream;
