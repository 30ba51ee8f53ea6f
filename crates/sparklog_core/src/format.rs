//! On-disk framing of a sparklog log.
//!
//! ## Layout
//!
//! ```text
//! | magic "SPLG" (4) | version (2) | reserved (2) |          file header
//! | type (1) | key_len (4) | value_len (8) | crc32 (4) |     entry header
//! | key (key_len) | value (value_len) |                    entry body
//! | type (1) | ...                                         next entry
//! ```
//!
//! All integers are little-endian. The CRC covers the first 13 bytes of the
//! entry header only, so an entry can be located and validated without
//! reading its body. DELETE entries always carry `value_len == 0`.

use crate::error::{CoreError, CoreResult};
use crate::types::EntryType;

/// Magic bytes at the start of every log file.
pub const LOG_MAGIC: [u8; 4] = *b"SPLG";

/// Current log format version.
pub const FORMAT_VERSION: u16 = 1;

/// Decoded file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    /// Format version the file was written with.
    pub version: u16,
}

impl LogHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 8;

    /// Header for the current format version.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: FORMAT_VERSION,
        }
    }

    /// Encodes the header.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&LOG_MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf
    }

    /// Decodes and validates a header.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for a short buffer, wrong magic or a version
    /// newer than [`FORMAT_VERSION`].
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CoreError::invalid_format(format!(
                "file header needs {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        if bytes[0..4] != LOG_MAGIC {
            return Err(CoreError::invalid_format("bad magic"));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version == 0 || version > FORMAT_VERSION {
            return Err(CoreError::invalid_format(format!(
                "unsupported version {version}"
            )));
        }
        Ok(Self { version })
    }
}

/// Decoded entry header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// PUT or DELETE.
    pub entry_type: EntryType,
    /// Key length in bytes.
    pub key_len: u32,
    /// Value length in bytes.
    pub value_len: u64,
}

impl EntryHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 17;

    const CRC_OFFSET: usize = 13;

    /// Encodes the header including its checksum.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.entry_type.as_byte();
        buf[1..5].copy_from_slice(&self.key_len.to_le_bytes());
        buf[5..13].copy_from_slice(&self.value_len.to_le_bytes());
        let crc = crc32fast::hash(&buf[..Self::CRC_OFFSET]);
        buf[Self::CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Decodes an entry header read at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a corruption error for an unknown type byte or a DELETE with
    /// a value, and `ChecksumMismatch` when `verify` is set and the CRC does
    /// not match.
    pub fn decode(bytes: &[u8], offset: u64, verify: bool) -> CoreResult<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CoreError::corruption(
                offset,
                format!("entry header needs {} bytes, got {}", Self::SIZE, bytes.len()),
            ));
        }

        if verify {
            let expected = u32::from_le_bytes([bytes[13], bytes[14], bytes[15], bytes[16]]);
            let actual = crc32fast::hash(&bytes[..Self::CRC_OFFSET]);
            if expected != actual {
                return Err(CoreError::ChecksumMismatch {
                    offset,
                    expected,
                    actual,
                });
            }
        }

        let entry_type = EntryType::from_byte(bytes[0]).ok_or_else(|| {
            CoreError::corruption(offset, format!("unknown entry type {:#04x}", bytes[0]))
        })?;
        let key_len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let value_len = u64::from_le_bytes([
            bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10], bytes[11], bytes[12],
        ]);

        if entry_type == EntryType::Delete && value_len != 0 {
            return Err(CoreError::corruption(
                offset,
                format!("delete entry carries a {value_len}-byte value"),
            ));
        }

        Ok(Self {
            entry_type,
            key_len,
            value_len,
        })
    }

    /// Size of the header plus body, or `None` on overflow.
    #[must_use]
    pub fn total_len(&self) -> Option<u64> {
        (Self::SIZE as u64)
            .checked_add(u64::from(self.key_len))?
            .checked_add(self.value_len)
    }
}

/// Encodes one complete entry (header and body).
///
/// The value of a DELETE entry is ignored.
///
/// # Errors
///
/// Returns `InvalidFormat` if the key is longer than `u32::MAX` bytes.
pub fn encode_entry(entry_type: EntryType, key: &[u8], value: &[u8]) -> CoreResult<Vec<u8>> {
    let value: &[u8] = match entry_type {
        EntryType::Put => value,
        EntryType::Delete => &[],
    };
    let header = EntryHeader {
        entry_type,
        key_len: u32::try_from(key.len()).map_err(|_| {
            CoreError::invalid_format(format!("key of {} bytes exceeds u32::MAX", key.len()))
        })?,
        value_len: value.len() as u64,
    };
    let mut buf = Vec::with_capacity(EntryHeader::SIZE + key.len() + value.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
    Ok(buf)
}
