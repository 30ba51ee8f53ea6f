//! Shared setup for the sparklog benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
