#![allow(dead_code)]

use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::Write;

// Hand-crafted archive builder. It writes the records byte by byte so tests can
// produce archives that disagree with themselves.

pub const DOS_DATE: u16 = ((2009 - 1980) << 9) | (6 << 5) | 13;
pub const DOS_TIME: u16 = (0 << 11) | (24 << 5) | (8 / 2);

#[derive(Clone)]
pub struct TestEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub method: u16,
    /// Name written into the local header, defaults to `name`
    pub local_name: Option<String>,
    /// Method written into the local header, defaults to `method`
    pub local_method: Option<u16>,
    pub version_needed: u16,
    /// Version written into the local header, defaults to `version_needed`
    pub local_version_needed: Option<u16>,
    pub disk_start: u16,
    pub extra: Vec<u8>,
    pub comment: String,
}

impl TestEntry {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        TestEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method: 0,
            local_name: None,
            local_method: None,
            version_needed: 10,
            local_version_needed: None,
            disk_start: 0,
            extra: Vec::new(),
            comment: String::new(),
        }
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        TestEntry {
            method: 8,
            version_needed: 20,
            ..Self::stored(name, data)
        }
    }

    pub fn dir(name: &str) -> Self {
        Self::stored(name, b"")
    }
}

#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<TestEntry>,
    comment: Vec<u8>,
    /// Raw bytes inserted between the last central directory record and the EOCD
    trailer_records: Vec<u8>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: TestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn trailer_records(mut self, raw: &[u8]) -> Self {
        self.trailer_records = raw.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let offset = out.len() as u32;
            let crc = crc32fast::hash(&entry.data);
            let payload = match entry.method {
                8 => deflate(&entry.data),
                _ => entry.data.clone(),
            };
            let local_name = entry.local_name.as_deref().unwrap_or(&entry.name);

            out.extend_from_slice(&0x04034b50u32.to_le_bytes());
            out.extend_from_slice(
                &entry
                    .local_version_needed
                    .unwrap_or(entry.version_needed)
                    .to_le_bytes(),
            );
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&entry.local_method.unwrap_or(entry.method).to_le_bytes());
            out.extend_from_slice(&DOS_TIME.to_le_bytes());
            out.extend_from_slice(&DOS_DATE.to_le_bytes());
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(local_name.len() as u16).to_le_bytes());
            out.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
            out.extend_from_slice(local_name.as_bytes());
            out.extend_from_slice(&entry.extra);
            out.extend_from_slice(&payload);

            central.extend_from_slice(&0x02014b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes()); // version made by
            central.extend_from_slice(&entry.version_needed.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // flags
            central.extend_from_slice(&entry.method.to_le_bytes());
            central.extend_from_slice(&DOS_TIME.to_le_bytes());
            central.extend_from_slice(&DOS_DATE.to_le_bytes());
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            central.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            central.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
            central.extend_from_slice(&(entry.comment.len() as u16).to_le_bytes());
            central.extend_from_slice(&entry.disk_start.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(entry.name.as_bytes());
            central.extend_from_slice(&entry.extra);
            central.extend_from_slice(entry.comment.as_bytes());
        }

        let cd_offset = out.len() as u32;
        let cd_size = central.len() as u32;
        out.extend_from_slice(&central);
        out.extend_from_slice(&self.trailer_records);

        let count = self.entries.len() as u16;
        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // this disk
        out.extend_from_slice(&0u16.to_le_bytes()); // directory disk
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.comment);
        out
    }
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn compressible_data(size: usize) -> Vec<u8> {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

pub fn write_archive(dir: &std::path::Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
