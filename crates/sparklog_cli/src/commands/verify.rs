//! Verify command implementation.

use serde::Serialize;
use sparklog_core::{CoreError, CoreResult, EntryHeader, HashReader, LogReader};
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Outcome of a verification pass.
#[derive(Debug, Default, Serialize)]
pub struct VerifyReport {
    /// Entries whose framing and bodies were read successfully.
    pub entries_checked: usize,
    /// Key and value bytes read.
    pub bytes_read: u64,
    /// Live keys whose lookup round-tripped.
    pub live_keys_checked: usize,
    /// Offset of the entry where verification stopped, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<u64>,
    /// The first fault found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyReport {
    /// Returns true when no fault was found.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the verify command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log = super::open_log(path)?;
    let report = verify(&log);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Verifying log at {}...", path.display());
            print_text_output(&report);
        }
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err("Log verification failed".into())
    }
}

fn print_text_output(report: &VerifyReport) {
    println!("  Entries checked: {}", report.entries_checked);
    println!("  Bytes read: {}", report.bytes_read);
    println!("  Live keys checked: {}", report.live_keys_checked);

    match &report.error {
        None => println!("Verification passed"),
        Some(error) => {
            let at = report
                .failed_at
                .map(|offset| format!(" at offset {offset}"))
                .unwrap_or_default();
            println!("Verification FAILED{at}: {error}");
        }
    }
}

/// Reads every byte of `log`, then checks that every live key is found
/// again by lookup.
pub fn verify(log: &Arc<LogReader>) -> VerifyReport {
    let mut report = VerifyReport::default();

    if let Err(err) = scan(log, &mut report) {
        report.error = Some(err.to_string());
        return report;
    }
    if let Err(err) = check_lookups(log, &mut report) {
        report.error = Some(err.to_string());
    }
    report
}

fn scan(log: &Arc<LogReader>, report: &mut VerifyReport) -> CoreResult<()> {
    let mut iter = log.iter();
    let mut sink = io::sink();
    let mut next_entry = log.data_start();

    loop {
        report.failed_at = Some(next_entry);
        iter.next()?;
        if !iter.is_valid() {
            break;
        }
        next_entry =
            iter.offset() + EntryHeader::SIZE as u64 + iter.key_len() + iter.value_len();
        report.failed_at = Some(iter.offset());
        report.bytes_read += iter.key_reader().drain_to(&mut sink)?;
        report.bytes_read += iter.value_reader().drain_to(&mut sink)?;
        report.entries_checked += 1;
    }

    report.failed_at = None;
    Ok(())
}

fn check_lookups(log: &Arc<LogReader>, report: &mut VerifyReport) -> CoreResult<()> {
    let reader = HashReader::open(Arc::clone(log))?;
    let mut iter = reader.iter();

    iter.next_live()?;
    while iter.is_valid() {
        let offset = iter.offset();
        let key = iter.read_key()?;

        let mut probe = reader.iter();
        probe.seek(&key)?;
        if !probe.is_valid() || probe.offset() != offset {
            report.failed_at = Some(offset);
            return Err(CoreError::IndexMismatch { offset });
        }
        report.live_keys_checked += 1;
        iter.next_live()?;
    }

    if report.live_keys_checked != reader.index().live_len() {
        return Err(CoreError::invalid_format(format!(
            "index reports {} live keys, scan found {}",
            reader.index().live_len(),
            report.live_keys_checked
        )));
    }
    Ok(())
}
