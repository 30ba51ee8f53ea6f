//! Concurrent reader stress helpers.
//!
//! Many iterators over one shared log, each driven by its own thread. Every
//! operation checks what it read, so a wrong byte counts as a failure just
//! like an error does.

use crate::fixtures::LogBuilder;
use sparklog_core::HashReader;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent readers.
    pub threads: usize,
    /// Size of each value in bytes.
    pub value_size: usize,
    /// Number of distinct keys in the log.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            value_size: 256,
            key_count: 1_000,
        }
    }
}

/// Key for entry `i` of a stress log.
pub fn stress_key(i: usize) -> Vec<u8> {
    format!("key-{i:08}").into_bytes()
}

/// Value for key `i` of a stress log: `size` bytes derived from `i`.
pub fn stress_value(i: usize, size: usize) -> Vec<u8> {
    (0..size).map(|b| ((i + b) % 251) as u8).collect()
}

/// Builds a log with `config.key_count` keys, each written twice so half
/// the log is shadowed.
pub fn stress_log(config: &StressConfig) -> HashReader {
    let stale = (0..config.key_count).fold(LogBuilder::new(), |b, i| {
        b.put(stress_key(i), b"stale")
    });
    let builder = (0..config.key_count).fold(stale, |b, i| {
        b.put(stress_key(i), stress_value(i, config.value_size))
    });
    HashReader::open(builder.open()).expect("Failed to index stress log")
}

/// Runs concurrent point lookups, each checked against the expected value.
pub fn stress_concurrent_gets(reader: &HashReader, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let start = Instant::now();

    thread::scope(|s| {
        for t in 0..config.threads {
            let (successful, failed) = (&successful, &failed);
            s.spawn(move || {
                let mut iter = reader.iter();
                for op in 0..config.operations {
                    let i = (t * 7919 + op) % config.key_count.max(1);
                    let expected = stress_value(i, config.value_size);
                    match iter.get(&stress_key(i)) {
                        Ok(Some(value)) if value == expected => {
                            successful.fetch_add(1, Ordering::Relaxed)
                        }
                        _ => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            });
        }
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    )
}

/// Runs concurrent full live scans; a scan succeeds when it reports every
/// key exactly once with its latest value.
pub fn stress_concurrent_scans(reader: &HashReader, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let scans = (config.operations / config.key_count.max(1)).max(1);
    let start = Instant::now();

    thread::scope(|s| {
        for _ in 0..config.threads {
            let (successful, failed) = (&successful, &failed);
            s.spawn(move || {
                for _ in 0..scans {
                    let mut seen = 0usize;
                    let mut ok = true;
                    for entry in reader.iter().live_entries() {
                        match entry {
                            Ok(e) if e.key == stress_key(seen) => {
                                ok &= e.value == stress_value(seen, config.value_size);
                                seen += 1;
                            }
                            _ => {
                                ok = false;
                                break;
                            }
                        }
                    }
                    if ok && seen == config.key_count {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> StressConfig {
        StressConfig {
            operations: 200,
            threads: 4,
            value_size: 64,
            key_count: 50,
        }
    }

    #[test]
    fn concurrent_gets_see_latest_values() {
        let config = small();
        let reader = stress_log(&config);
        let result = stress_concurrent_gets(&reader, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.total_ops, config.threads * config.operations);
    }

    #[test]
    fn concurrent_scans_agree() {
        let config = small();
        let reader = stress_log(&config);
        let result = stress_concurrent_scans(&reader, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, config.threads * 4);
    }
}
