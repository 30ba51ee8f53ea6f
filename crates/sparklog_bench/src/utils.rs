//! Benchmark utilities.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use sparklog_core::{HashReader, LogReader};
use sparklog_testkit::{LogBuilder, TestLog};
use std::sync::Arc;

/// Fixed seed so every run benchmarks the same log.
const SEED: u64 = 0x5eed;

/// Generate random data of the specified size.
pub fn random_data(rng: &mut impl Rng, size: usize) -> Vec<u8> {
    (0..size).map(|_| rng.gen()).collect()
}

/// Key for entry `i`.
pub fn bench_key(i: usize) -> Vec<u8> {
    format!("bench-key-{i:010}").into_bytes()
}

/// Builds a log of `count` PUTs with random `value_size`-byte values.
///
/// With `overwrite_every` set, every n-th key is written a second time at
/// the end of the log, shadowing its first version.
pub fn build_log(count: usize, value_size: usize, overwrite_every: Option<usize>) -> LogBuilder {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut builder = (0..count).fold(LogBuilder::new(), |b, i| {
        b.put(bench_key(i), random_data(&mut rng, value_size))
    });
    if let Some(n) = overwrite_every {
        for i in (0..count).step_by(n.max(1)) {
            builder = builder.put(bench_key(i), random_data(&mut rng, value_size));
        }
    }
    builder
}

/// Opens a generated log on memory.
pub fn memory_log(count: usize, value_size: usize) -> Arc<LogReader> {
    build_log(count, value_size, None).open()
}

/// Writes a generated log to a temporary file and opens it.
pub fn file_log(count: usize, value_size: usize) -> TestLog {
    TestLog::file(&build_log(count, value_size, None))
}

/// Opens a generated log with half its keys overwritten, plus its index.
pub fn hash_reader(count: usize, value_size: usize) -> HashReader {
    let log = build_log(count, value_size, Some(2)).open();
    HashReader::open(log).expect("Failed to index bench log")
}

/// Keys `0..count` in a fixed shuffled order.
pub fn shuffled_keys(count: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut keys: Vec<_> = (0..count).map(bench_key).collect();
    keys.shuffle(&mut rng);
    keys
}
