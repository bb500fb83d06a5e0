//! Error types for s-unzip

use crate::entry::EntryType;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for s-unzip operations
pub type Result<T> = std::result::Result<T, ZipError>;

/// Error types that can occur while reading a ZIP archive
///
/// Every variant is fatal to the operation in progress. Nothing is retried.
#[derive(Debug, Error)]
pub enum ZipError {
    /// I/O error from the byte source or the destination filesystem
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Invalid ZIP format or structure
    #[error("Invalid ZIP format: {0}")]
    InvalidFormat(String),
    /// Archive feature outside the supported baseline (multi-disk, ZIP64, newer versions)
    #[error("Unsupported ZIP feature: {0}")]
    Unsupported(String),
    /// Unsupported compression method
    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u16),
    /// Attempt to open the data of an entry that is not a regular file
    #[error("Unsupported entry type: {0:?}")]
    UnsupportedEntryType(EntryType),
    /// Local file header disagrees with the central directory record
    #[error("Corrupted or mismatched entry: {0}")]
    EntryMismatch(String),
    /// A fixed-width or exact-length read ran out of input
    #[error("Unexpected end of stream")]
    UnexpectedEof,
    /// Entry not found in ZIP archive
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    /// Extraction destination is not a directory
    #[error("Destination is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl ZipError {
    /// Map a short read to [`ZipError::UnexpectedEof`], keep every other I/O error as-is.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ZipError::UnexpectedEof
        } else {
            ZipError::Io(err)
        }
    }
}
