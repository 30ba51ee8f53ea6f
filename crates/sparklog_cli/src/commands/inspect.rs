//! Inspect command implementation.

use serde::Serialize;
use sparklog_core::{CoreResult, EntryType, KeyIndex, LogReader, MemoryHashIndex};
use std::path::Path;
use std::sync::Arc;

/// Log inspection result.
#[derive(Debug, Default, Serialize)]
pub struct InspectResult {
    /// Log path.
    pub path: String,
    /// File format version.
    pub version: u16,
    /// File size in bytes.
    pub size: u64,
    /// Number of entries.
    pub entry_count: usize,
    /// Number of PUT entries.
    pub put_count: usize,
    /// Number of DELETE entries.
    pub delete_count: usize,
    /// Number of distinct keys.
    pub key_count: usize,
    /// Number of keys whose latest entry is a PUT.
    pub live_key_count: usize,
    /// Longest key in bytes.
    pub max_key_len: u64,
    /// Longest value in bytes.
    pub max_value_len: u64,
    /// Sum of all key lengths.
    pub total_key_bytes: u64,
    /// Sum of all value lengths.
    pub total_value_bytes: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log = super::open_log(path)?;
    let mut result = analyze(&log)?;
    result.path = path.display().to_string();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Scans `log` once, collecting statistics and an index of its keys.
///
/// Only entry headers and keys are read; values are skipped.
pub fn analyze(log: &Arc<LogReader>) -> CoreResult<InspectResult> {
    let mut result = InspectResult {
        version: log.header().version,
        size: log.end_offset(),
        ..InspectResult::default()
    };
    let mut index = MemoryHashIndex::new();

    let mut iter = log.iter();
    iter.next()?;
    while iter.is_valid() {
        result.entry_count += 1;
        match iter.entry_type() {
            EntryType::Put => result.put_count += 1,
            EntryType::Delete => result.delete_count += 1,
        }
        result.max_key_len = result.max_key_len.max(iter.key_len());
        result.max_value_len = result.max_value_len.max(iter.value_len());
        result.total_key_bytes += iter.key_len();
        result.total_value_bytes += iter.value_len();

        let offset = iter.offset();
        let entry_type = iter.entry_type();
        index.record(iter.read_key()?.to_vec(), offset, entry_type);
        iter.next()?;
    }

    result.key_count = index.len();
    result.live_key_count = index.live_len();
    Ok(result)
}

fn print_text_output(result: &InspectResult) {
    println!("sparklog Log Inspection");
    println!("=======================");
    println!();
    println!("Path: {}", result.path);
    println!("Format version: {}", result.version);
    println!("Size: {} bytes", result.size);
    println!();
    println!("Entries: {}", result.entry_count);
    println!("  Puts: {}", result.put_count);
    println!("  Deletes: {}", result.delete_count);
    println!("Keys: {}", result.key_count);
    println!("  Live: {}", result.live_key_count);
    println!();
    println!("Longest key: {} bytes", result.max_key_len);
    println!("Longest value: {} bytes", result.max_value_len);
    println!("Key bytes: {}", result.total_key_bytes);
    println!("Value bytes: {}", result.total_value_bytes);
}
