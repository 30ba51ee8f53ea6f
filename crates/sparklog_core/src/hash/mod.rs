//! Hash-indexed access to a log.
//!
//! A [`KeyIndex`] maps a key to the offset of its most recent entry. The
//! [`HashIterator`] uses it to jump straight to a key ([`seek`], [`get`]) and
//! to walk only the live entries of a log ([`next_live`]).
//!
//! [`seek`]: HashIterator::seek
//! [`get`]: HashIterator::get
//! [`next_live`]: HashIterator::next_live

mod index;
mod iterator;
mod reader;

pub use index::{IndexEntry, KeyIndex, MemoryHashIndex};
pub use iterator::{HashIterator, LiveEntries};
pub use reader::HashReader;
