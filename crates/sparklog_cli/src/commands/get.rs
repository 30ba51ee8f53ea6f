//! Get command implementation.

use super::hex_encode;
use sparklog_core::{CoreResult, HashReader, LogReader};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Runs the get command.
///
/// The value is written to stdout as raw bytes, or hex-encoded with `hex`.
pub fn run(path: &Path, key: &[u8], hex: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log = super::open_log(path)?;
    let value = lookup(log, key)?.ok_or("Key not found")?;

    let mut stdout = std::io::stdout().lock();
    if hex {
        writeln!(stdout, "{}", hex_encode(&value))?;
    } else {
        stdout.write_all(&value)?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    Ok(())
}

/// Returns the live value of `key`, or `None` if it is absent or deleted.
pub fn lookup(log: Arc<LogReader>, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
    let reader = HashReader::open(log)?;
    Ok(reader.get(key)?.map(|value| value.to_vec()))
}
