//! # sparklog testkit
//!
//! Test utilities for sparklog.
//!
//! This crate provides:
//! - Log fixtures: a builder for hand-made logs and the standard four-entry log
//! - A storage backend that fails on demand, for fault-path tests
//! - Property-based test generators with a reference model of live keys
//! - Concurrent reader stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sparklog_testkit::prelude::*;
//!
//! #[test]
//! fn reads_first_entry() {
//!     let log = default_log();
//!     let mut iter = log.iter();
//!     iter.next().unwrap();
//!     assert_eq!(iter.read_key().unwrap(), "xk");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
