//! Helpers for building small logs in unit tests.

use crate::format::{encode_entry, LogHeader};
use crate::log::LogReader;
use crate::types::EntryType;
use sparklog_storage::InMemoryBackend;
use std::sync::Arc;

pub(crate) fn very_long_value() -> Vec<u8> {
    b"0123456789abcdef".repeat(8 * 1024)
}

pub(crate) fn log_bytes(entries: &[(EntryType, &[u8], &[u8])]) -> Vec<u8> {
    let mut buf = LogHeader::current().encode().to_vec();
    for (entry_type, key, value) in entries {
        buf.extend(encode_entry(*entry_type, key, value).unwrap());
    }
    buf
}

pub(crate) fn open_log(entries: &[(EntryType, &[u8], &[u8])]) -> Arc<LogReader> {
    LogReader::open(Box::new(InMemoryBackend::with_data(log_bytes(entries)))).unwrap()
}

/// `xk=short`, `yk=longvalue`, `zk=<very long>`, delete `yk`.
pub(crate) fn default_log() -> Arc<LogReader> {
    let long = very_long_value();
    open_log(&[
        (EntryType::Put, b"xk", b"short"),
        (EntryType::Put, b"yk", b"longvalue"),
        (EntryType::Put, b"zk", &long),
        (EntryType::Delete, b"yk", b""),
    ])
}
