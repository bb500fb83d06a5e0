//! Central directory parser and the read-only entry catalog it produces

use crate::data_input::ZipDataReader;
use crate::entry::{decode_ascii, dos_to_datetime, CompressionMethod, EntryType, ZipEntry};
use crate::error::{Result, ZipError};
use crate::locator::{find_directory, END_OF_CENTRAL_DIRECTORY_SIGNATURE};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};

/// ZIP central directory signature
pub(crate) const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x02014b50;

/// Digital signature record, may follow the last central directory header
const DIGITAL_SIGNATURE_SIGNATURE: u32 = 0x05054b50;

/// ZIP64 end of central directory record signature
const ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06064b50;

/// ZIP64 end of central directory locator signature
const ZIP64_END_OF_CENTRAL_DIRECTORY_LOCATOR_SIGNATURE: u32 = 0x07064b50;

/// Highest "version needed to extract" we can handle (2.0)
pub(crate) const MAX_VERSION_NEEDED: u16 = 20;

/// Immutable snapshot of an archive's central directory
///
/// Entries keep directory order, duplicates and unnamed entries included. Name
/// lookups resolve to the first entry carrying that name.
#[derive(Debug, Clone, Default)]
pub struct ZipCatalog {
    entries: Vec<ZipEntry>,
    by_name: HashMap<String, usize>,
}

impl ZipCatalog {
    fn from_entries(entries: Vec<ZipEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.name.is_empty() {
                continue;
            }
            if let Entry::Vacant(slot) = by_name.entry(entry.name.clone()) {
                slot.insert(index);
            }
        }
        ZipCatalog { entries, by_name }
    }

    /// All entries in directory order
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Find an entry by exact name
    pub fn get(&self, name: &str) -> Option<&ZipEntry> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ZipEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct non-empty names reachable through [`ZipCatalog::get`]
    pub fn indexed_len(&self) -> usize {
        self.by_name.len()
    }
}

impl<'a> IntoIterator for &'a ZipCatalog {
    type Item = &'a ZipEntry;
    type IntoIter = std::slice::Iter<'a, ZipEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Read the catalog of the ZIP file at `path`
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<ZipCatalog> {
    let file = BufReader::new(File::open(path)?);
    read_directory(find_directory(file)?)
}

/// Parse a central directory.
///
/// `source` must be positioned at the first central directory record. It is
/// consumed and dropped whether parsing succeeds or not.
pub fn read_directory<R: Read>(source: R) -> Result<ZipCatalog> {
    let mut input = ZipDataReader::new(source);
    let mut entries = Vec::new();

    let mut sig = input.read_u32_le()?;
    while sig == CENTRAL_DIRECTORY_SIGNATURE {
        let entry = read_directory_record(&mut input)?;
        trace!(
            name = %entry.name,
            offset = entry.offset,
            method = %entry.compression_method,
            "central directory record"
        );
        entries.push(entry);
        sig = input.read_u32_le()?;
    }

    if sig == DIGITAL_SIGNATURE_SIGNATURE {
        let size = input.read_u16_le()?;
        input.skip_fully(u64::from(size))?;
        sig = input.read_u32_le()?;
    }

    if sig == ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE
        || sig == ZIP64_END_OF_CENTRAL_DIRECTORY_LOCATOR_SIGNATURE
    {
        return Err(ZipError::Unsupported(
            "ZIP64 records are not supported".to_string(),
        ));
    }

    if sig != END_OF_CENTRAL_DIRECTORY_SIGNATURE {
        return Err(ZipError::InvalidFormat(format!(
            "unexpected signature 0x{:08x} in central directory",
            sig
        )));
    }

    let catalog = ZipCatalog::from_entries(entries);
    debug!(
        entries = catalog.len(),
        directory_len = input.offset(),
        "read central directory"
    );
    Ok(catalog)
}

/// Parse one central directory file header, signature already consumed
fn read_directory_record<R: Read>(input: &mut ZipDataReader<R>) -> Result<ZipEntry> {
    let _version_made_by = input.read_u16_le()?;
    let version_needed = input.read_u16_le()?;
    if version_needed > MAX_VERSION_NEEDED {
        return Err(ZipError::Unsupported(format!(
            "entry needs version {}.{} to extract",
            version_needed / 10,
            version_needed % 10
        )));
    }
    let _flags = input.read_u16_le()?;
    let compression_method = CompressionMethod::from_u16(input.read_u16_le()?);
    let mod_time = input.read_u16_le()?;
    let mod_date = input.read_u16_le()?;
    let crc32 = input.read_u32_le()?;
    let compressed_size = u64::from(input.read_u32_le()?);
    let uncompressed_size = u64::from(input.read_u32_le()?);
    let name_len = input.read_u16_le()?;
    let extra_len = input.read_u16_le()?;
    let comment_len = input.read_u16_le()?;
    let disk_start = input.read_u16_le()?;
    if disk_start != 0 {
        return Err(ZipError::Unsupported(
            "multi-disk archives are not supported".to_string(),
        ));
    }
    let _internal_attributes = input.read_u16_le()?;
    let _external_attributes = input.read_u32_le()?;
    let offset = u64::from(input.read_u32_le()?);

    let name = decode_ascii(&input.read_vec(usize::from(name_len))?);
    let extra = input.read_vec(usize::from(extra_len))?;
    let comment = decode_ascii(&input.read_vec(usize::from(comment_len))?);

    if name.starts_with('/') {
        return Err(ZipError::InvalidFormat(format!(
            "leading slash not allowed in entry name \"{}\"",
            name
        )));
    }

    Ok(ZipEntry {
        entry_type: EntryType::classify(&name, uncompressed_size),
        modified: dos_to_datetime(mod_date, mod_time)?,
        name,
        comment,
        offset,
        uncompressed_size,
        compressed_size,
        crc32,
        compression_method,
        extra,
    })
}
