//! CLI command implementations.

pub mod dump;
pub mod get;
pub mod inspect;
pub mod verify;

use sparklog_core::LogReader;
use sparklog_storage::FileBackend;
use std::path::Path;
use std::sync::Arc;

/// Opens the log at `path` without write access.
pub fn open_log(path: &Path) -> Result<Arc<LogReader>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No log found at {}", path.display()).into());
    }
    let backend = FileBackend::open_read_only(path)?;
    Ok(LogReader::open(Box::new(backend))?)
}

/// Renders bytes for display: as text when printable ASCII, else as hex.
pub fn display_bytes(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        format!("0x{}", hex_encode(bytes))
    }
}

/// Lowercase hex encoding.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
