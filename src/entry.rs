//! Catalog entry metadata

use crate::error::{Result, ZipError};
use std::fmt;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

/// Compression method recorded for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// No compression (stored)
    Stored,
    /// Raw DEFLATE
    Deflate,
    /// Anything else, with the raw method code
    Other(u16),
}

impl CompressionMethod {
    pub fn from_u16(code: u16) -> Self {
        match code {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Other(code),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Other(code) => code,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Stored => f.write_str("stored"),
            CompressionMethod::Deflate => f.write_str("deflate"),
            CompressionMethod::Other(code) => write!(f, "method {}", code),
        }
    }
}

/// Kind of an entry, derived from its name and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    File,
    Directory,
    /// Reserved for kinds signalled outside the base format (e.g. symlinks)
    Other,
}

impl EntryType {
    /// A zero-length entry whose name ends with `/` is a directory, anything else a file.
    pub fn classify(name: &str, uncompressed_size: u64) -> Self {
        if uncompressed_size == 0 && name.ends_with('/') {
            EntryType::Directory
        } else {
            EntryType::File
        }
    }
}

/// Entry in the ZIP central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    pub comment: String,
    /// Offset of the local file header from the start of the archive
    pub offset: u64,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    /// Stored checksum; informational, never verified
    pub crc32: u32,
    pub entry_type: EntryType,
    pub modified: PrimitiveDateTime,
    pub compression_method: CompressionMethod,
    /// Raw extra field, uninterpreted
    pub extra: Vec<u8>,
}

impl ZipEntry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }
}

/// Decode bytes as US-ASCII. Bytes outside the ASCII range become U+FFFD.
pub(crate) fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                b as char
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect()
}

/// Convert a packed DOS date/time pair into a calendar timestamp.
///
/// Hour, minute, second and month are clamped into range. The day is applied as an
/// offset from the first of the month, so day 0 or 31 February roll over into the
/// neighbouring month instead of failing.
pub fn dos_to_datetime(dos_date: u16, dos_time: u16) -> Result<PrimitiveDateTime> {
    let hour = ((dos_time >> 11) as u8).min(23);
    let minute = (((dos_time >> 5) & 0x3f) as u8).min(59);
    let second = (((dos_time & 0x1f) * 2) as u8).min(59);

    let year = 1980 + i32::from(dos_date >> 9);
    let month = (((dos_date >> 5) & 0x0f) as u8).clamp(1, 12);
    let day = i64::from(dos_date & 0x1f);

    let month = Month::try_from(month).map_err(|e| ZipError::InvalidFormat(e.to_string()))?;
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|e| ZipError::InvalidFormat(e.to_string()))?;
    let date = first
        .checked_add(Duration::days(day - 1))
        .ok_or_else(|| ZipError::InvalidFormat("modification date out of range".to_string()))?;
    let time =
        Time::from_hms(hour, minute, second).map_err(|e| ZipError::InvalidFormat(e.to_string()))?;

    Ok(PrimitiveDateTime::new(date, time))
}
