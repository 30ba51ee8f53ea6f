//! Dump command implementation.

use super::display_bytes;
use serde::Serialize;
use sparklog_core::{CoreResult, HashReader, LogEntry, LogReader};
use std::path::Path;
use std::sync::Arc;

/// Entry representation for output.
#[derive(Debug, Serialize)]
pub struct EntryInfo {
    /// Offset in the log file.
    pub offset: u64,
    /// Entry type.
    pub entry_type: String,
    /// Key, as text or hex.
    pub key: String,
    /// Value, as text or hex; absent for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Value size in bytes.
    pub value_len: usize,
}

impl From<LogEntry> for EntryInfo {
    fn from(entry: LogEntry) -> Self {
        let value = match entry.entry_type {
            sparklog_core::EntryType::Put => Some(display_bytes(&entry.value)),
            sparklog_core::EntryType::Delete => None,
        };
        Self {
            offset: entry.offset,
            entry_type: entry.entry_type.to_string(),
            key: display_bytes(&entry.key),
            value,
            value_len: entry.value.len(),
        }
    }
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    skip: usize,
    live: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = super::open_log(path)?;
    let entries = collect_entries(log, limit, skip, live)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            print_text_output(&entries);
        }
    }

    Ok(())
}

/// Reads up to `limit` entries after skipping `skip`, optionally keeping
/// only the live version of each key.
pub fn collect_entries(
    log: Arc<LogReader>,
    limit: Option<usize>,
    skip: usize,
    live: bool,
) -> CoreResult<Vec<EntryInfo>> {
    let max_entries = limit.unwrap_or(usize::MAX);

    if live {
        HashReader::open(log)?
            .iter()
            .live_entries()
            .skip(skip)
            .take(max_entries)
            .map(|e| e.map(EntryInfo::from))
            .collect()
    } else {
        let mut iter = log.iter();
        iter.skip(skip)?;
        iter.entries()
            .take(max_entries)
            .map(|e| e.map(EntryInfo::from))
            .collect()
    }
}

fn print_text_output(entries: &[EntryInfo]) {
    println!("Log Entries ({} total)", entries.len());
    println!("================");
    println!();

    for entry in entries {
        print!("[{:08}] {:6} {}", entry.offset, entry.entry_type, entry.key);
        if let Some(ref value) = entry.value {
            let preview: String = value.chars().take(64).collect();
            print!(" = {preview}");
            if preview.len() < value.len() {
                print!("... ({} bytes)", entry.value_len);
            }
        }
        println!();
    }
}
