//! Streaming entry reader
//!
//! Opening an entry reads its local file header, checks it against the catalog,
//! and stacks bounded and decompressing readers on top of the raw data so the
//! caller sees exactly `uncompressed_size` bytes at most.

use crate::catalog::{read_directory, ZipCatalog, MAX_VERSION_NEEDED};
use crate::data_input::ZipDataReader;
use crate::entry::{decode_ascii, CompressionMethod, EntryType, ZipEntry};
use crate::error::{Result, ZipError};
use crate::limited::LimitedReader;
use crate::locator::find_directory;
use flate2::read::DeflateDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// ZIP local file header signature
const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034b50;

/// Upper bound on the buffer reserved up front by [`StreamingZipReader::read_entry`].
/// The declared size comes from the archive and is not trusted.
const READ_CAPACITY_HINT: u64 = 64 * 1024;

/// Decompressed view of one entry's data
///
/// Dropping or [closing](EntryReader::close) it releases every layer, down to the
/// source it was opened on.
#[derive(Debug)]
pub enum EntryReader<R: Read> {
    /// Stored data, bounded by the compressed size
    Stored(LimitedReader<R>),
    /// Raw DEFLATE bounded by the compressed size on input and the uncompressed size on output
    Deflate(LimitedReader<DeflateDecoder<LimitedReader<R>>>),
}

impl<R: Read> EntryReader<R> {
    /// Release the whole reader chain. Calling it again is a no-op.
    pub fn close(&mut self) {
        match self {
            EntryReader::Stored(r) => r.close(),
            EntryReader::Deflate(r) => r.close(),
        }
    }

    /// Bytes this reader may still yield
    pub fn remaining(&self) -> u64 {
        match self {
            EntryReader::Stored(r) => r.remaining(),
            EntryReader::Deflate(r) => r.remaining(),
        }
    }
}

impl<R: Read> Read for EntryReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntryReader::Stored(r) => r.read(buf),
            EntryReader::Deflate(r) => r.read(buf),
        }
    }
}

/// Open an entry on a source positioned at its local file header.
///
/// The source is consumed. On failure it is dropped before the error is returned.
pub fn open_entry<R: Read>(source: R, entry: &ZipEntry) -> Result<EntryReader<R>> {
    let mut input = ZipDataReader::new(source);
    read_local_header(&mut input, entry)?;
    debug!(
        name = %entry.name,
        method = %entry.compression_method,
        compressed_size = entry.compressed_size,
        uncompressed_size = entry.uncompressed_size,
        "opened entry"
    );
    decompress(input.into_inner(), entry)
}

/// Seek a random-access source to the entry's local header, then [`open_entry`].
pub fn open_entry_at<R: Read + Seek>(mut source: R, entry: &ZipEntry) -> Result<EntryReader<R>> {
    source.seek(SeekFrom::Start(entry.offset))?;
    open_entry(source, entry)
}

/// Read and verify a local file header, leaving `input` at the entry's raw data.
///
/// The central directory is authoritative: local times, CRC and sizes are ignored,
/// but the compression method and name must match byte for byte.
pub fn read_local_header<R: Read>(input: &mut ZipDataReader<R>, entry: &ZipEntry) -> Result<()> {
    let signature = input.read_u32_le()?;
    if signature != LOCAL_FILE_HEADER_SIGNATURE {
        return Err(ZipError::InvalidFormat(format!(
            "invalid local file header signature 0x{:08x} for \"{}\"",
            signature, entry.name
        )));
    }

    let version_needed = input.read_u16_le()?;
    if version_needed > MAX_VERSION_NEEDED {
        return Err(ZipError::Unsupported(format!(
            "entry \"{}\" needs version {}.{} to extract",
            entry.name,
            version_needed / 10,
            version_needed % 10
        )));
    }
    let _flags = input.read_u16_le()?;
    let method = CompressionMethod::from_u16(input.read_u16_le()?);

    // mod time/date, crc32, compressed and uncompressed size
    input.skip_fully(16)?;

    let name_len = input.read_u16_le()?;
    let extra_len = input.read_u16_le()?;
    let name = decode_ascii(&input.read_vec(usize::from(name_len))?);

    if method != entry.compression_method {
        return Err(ZipError::EntryMismatch(format!(
            "compression methods do not match (expected \"{}\", got \"{}\")",
            entry.compression_method, method
        )));
    }
    if name != entry.name {
        return Err(ZipError::EntryMismatch(format!(
            "file names do not match (expected \"{}\", got \"{}\")",
            entry.name, name
        )));
    }

    input.skip_fully(u64::from(extra_len))
}

/// Stack the reader chain for an entry on top of its raw data.
pub fn decompress<R: Read>(raw: R, entry: &ZipEntry) -> Result<EntryReader<R>> {
    if entry.entry_type != EntryType::File {
        return Err(ZipError::UnsupportedEntryType(entry.entry_type));
    }

    let limited = LimitedReader::new(raw, entry.compressed_size);
    match entry.compression_method {
        CompressionMethod::Stored => Ok(EntryReader::Stored(limited)),
        CompressionMethod::Deflate => Ok(EntryReader::Deflate(LimitedReader::new(
            DeflateDecoder::new(limited),
            entry.uncompressed_size,
        ))),
        CompressionMethod::Other(code) => Err(ZipError::UnsupportedCompression(code)),
    }
}

/// Streaming ZIP archive reader
///
/// Holds the parsed catalog and the archive path. Every opened entry gets its own
/// file handle, so entries can be read independently and from several threads.
#[derive(Debug, Clone)]
pub struct StreamingZipReader {
    path: PathBuf,
    catalog: ZipCatalog,
}

impl StreamingZipReader {
    /// Open a ZIP file and read its central directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = BufReader::new(File::open(&path)?);
        let catalog = read_directory(find_directory(file)?)?;

        Ok(StreamingZipReader { path, catalog })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> &ZipCatalog {
        &self.catalog
    }

    /// Get list of all entries in the ZIP
    pub fn entries(&self) -> &[ZipEntry] {
        self.catalog.entries()
    }

    /// Find an entry by name
    pub fn find_entry(&self, name: &str) -> Option<&ZipEntry> {
        self.catalog.get(name)
    }

    /// Get a streaming reader for an entry
    pub fn open_entry(&self, entry: &ZipEntry) -> Result<EntryReader<BufReader<File>>> {
        let file = BufReader::new(File::open(&self.path)?);
        open_entry_at(file, entry)
    }

    /// Get a streaming reader for an entry by name
    pub fn open_entry_by_name(&self, name: &str) -> Result<EntryReader<BufReader<File>>> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| ZipError::EntryNotFound(name.to_string()))?;
        self.open_entry(entry)
    }

    /// Read an entry's decompressed data into a vector
    pub fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        let mut reader = self.open_entry(entry)?;
        let hint = entry.uncompressed_size.min(READ_CAPACITY_HINT);
        let mut data = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
        reader.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry by name
    pub fn read_entry_by_name(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| ZipError::EntryNotFound(name.to_string()))?;
        self.read_entry(entry)
    }
}
