//! End-of-central-directory locator
//!
//! The EOCD record is 22 bytes followed by a comment of up to 65535 bytes, so its
//! position is not known up front. We check the no-comment position first, then
//! scan backwards through trailing windows that grow by a factor of four, only
//! looking at bytes the previous window did not cover.

use crate::data_input::ZipDataReader;
use crate::error::{Result, ZipError};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// ZIP end of central directory signature
pub(crate) const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06054b50;

/// Fixed part of the EOCD record
pub(crate) const EOCD_LEN: u64 = 22;

/// Largest comment the EOCD record can describe
const MAX_COMMENT_LEN: u64 = 0xffff;

/// First trailing window tried after the no-comment fast path
const INITIAL_WINDOW: u64 = 64;

/// Fields of the EOCD record that follow the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndOfCentralDirectory {
    disk_number: u16,
    directory_disk: u16,
    entries_on_disk: u16,
    total_entries: u16,
    directory_size: u32,
    directory_offset: u32,
}

/// Find the central directory of a seekable archive.
///
/// On success the source is positioned at the first central directory record.
/// Multi-disk archives and EOCD records with inconsistent entry counts are rejected.
pub fn find_directory<R: Read + Seek>(mut source: R) -> Result<R> {
    let eocd_start = locate_eocd(&mut source)?;

    source.seek(SeekFrom::Start(eocd_start + 4))?;
    let eocd = read_eocd_fields(&mut ZipDataReader::new(&mut source))?;
    debug!(
        eocd_start,
        entries = eocd.total_entries,
        directory_offset = eocd.directory_offset,
        directory_size = eocd.directory_size,
        "located end of central directory"
    );

    if eocd.disk_number != 0 || eocd.directory_disk != 0 {
        return Err(ZipError::Unsupported(
            "multi-disk archives are not supported".to_string(),
        ));
    }
    if eocd.entries_on_disk != eocd.total_entries {
        return Err(ZipError::InvalidFormat(format!(
            "entry count inconsistency in end of central directory ({} on disk, {} total)",
            eocd.entries_on_disk, eocd.total_entries
        )));
    }

    source.seek(SeekFrom::Start(u64::from(eocd.directory_offset)))?;
    Ok(source)
}

fn read_eocd_fields<R: Read>(input: &mut ZipDataReader<R>) -> Result<EndOfCentralDirectory> {
    Ok(EndOfCentralDirectory {
        disk_number: input.read_u16_le()?,
        directory_disk: input.read_u16_le()?,
        entries_on_disk: input.read_u16_le()?,
        total_entries: input.read_u16_le()?,
        directory_size: input.read_u32_le()?,
        directory_offset: input.read_u32_le()?,
    })
}

/// Return the absolute offset of the EOCD signature.
///
/// When the signature bytes also occur inside the trailing comment, the match
/// closest to the end of the file wins.
pub fn locate_eocd<R: Read + Seek>(source: &mut R) -> Result<u64> {
    let len = source.seek(SeekFrom::End(0))?;
    if len < EOCD_LEN {
        return Err(ZipError::InvalidFormat(
            "file is too short to hold an end of central directory record".to_string(),
        ));
    }

    let max_window = (EOCD_LEN + MAX_COMMENT_LEN).min(len);

    // Common case: no archive comment.
    if let Some(pos) = scan_window(source, len - EOCD_LEN, len - EOCD_LEN + 1)? {
        return Ok(pos);
    }

    let mut scanned = EOCD_LEN;
    let mut window = INITIAL_WINDOW;
    while scanned < max_window {
        let window_size = window.min(max_window);
        let start = len - window_size;
        let end = len - scanned;
        trace!(start, end, "scanning for end of central directory");
        if let Some(pos) = scan_window(source, start, end)? {
            return Ok(pos);
        }
        scanned = window_size;
        window = window.saturating_mul(4);
    }

    Err(ZipError::InvalidFormat(
        "no end of central directory record found".to_string(),
    ))
}

/// Scan candidate signature positions in `[start, end)` from the end inward.
///
/// Candidates never lie past `len - EOCD_LEN`, so the four byte read at any of them
/// stays inside the file.
fn scan_window<R: Read + Seek>(source: &mut R, start: u64, end: u64) -> Result<Option<u64>> {
    if start >= end {
        return Ok(None);
    }
    let span = usize::try_from(end - start)
        .map_err(|_| ZipError::InvalidFormat("scan window too large".to_string()))?;

    source.seek(SeekFrom::Start(start))?;
    let mut buf = vec![0u8; span + 3];
    ZipDataReader::new(&mut *source).read_fully(&mut buf)?;

    // Rolling window: shift one byte in from the front on each step.
    let mut sig = u32::from_le_bytes([buf[span - 1], buf[span], buf[span + 1], buf[span + 2]]);
    let mut i = span - 1;
    loop {
        if sig == END_OF_CENTRAL_DIRECTORY_SIGNATURE {
            return Ok(Some(start + i as u64));
        }
        if i == 0 {
            return Ok(None);
        }
        i -= 1;
        sig = (sig << 8) | u32::from(buf[i]);
    }
}
