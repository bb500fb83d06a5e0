//! # s-unzip: Streaming ZIP Catalog Reader
//!
//! `s-unzip` reads the central directory of a ZIP archive without loading the
//! archive, and exposes each entry's data as a bounded, decompressing stream.
//!
//! ## Features
//!
//! - **Catalog**: entries in directory order plus a first-occurrence-wins name index
//! - **Streaming Read**: entries are decompressed on the fly, never past their declared size
//! - **Cross-checked**: every local file header is verified against the central directory
//! - **Extraction**: materialize a whole archive under a destination directory
//!
//! Only the `stored` and `deflate` methods are supported. ZIP64 and multi-disk
//! archives are rejected, and CRC-32 values are exposed but never verified.
//!
//! ## Quick Start
//!
//! ### Reading a ZIP file
//!
//! ```no_run
//! use s_unzip::StreamingZipReader;
//! use std::io::Read;
//!
//! let reader = StreamingZipReader::open("archive.zip")?;
//!
//! // List all entries
//! for entry in reader.entries() {
//!     println!("{}: {} bytes", entry.name, entry.uncompressed_size);
//! }
//!
//! // Stream a specific file
//! let mut data = String::new();
//! reader.open_entry_by_name("file.txt")?.read_to_string(&mut data)?;
//! # Ok::<(), s_unzip::ZipError>(())
//! ```
//!
//! ### Working on any seekable source
//!
//! ```no_run
//! use s_unzip::{find_directory, open_entry_at, read_directory};
//! use std::io::{Cursor, Read};
//!
//! let bytes: Vec<u8> = std::fs::read("archive.zip")?;
//! let catalog = read_directory(find_directory(Cursor::new(&bytes))?)?;
//!
//! if let Some(entry) = catalog.get("file.txt") {
//!     let mut data = Vec::new();
//!     open_entry_at(Cursor::new(&bytes), entry)?.read_to_end(&mut data)?;
//! }
//! # Ok::<(), s_unzip::ZipError>(())
//! ```
//!
//! ### Extracting an archive
//!
//! ```no_run
//! s_unzip::extract("archive.zip", "out")?;
//! # Ok::<(), s_unzip::ZipError>(())
//! ```

pub mod catalog;
pub mod data_input;
pub mod entry;
pub mod error;
pub mod extract;
pub mod limited;
pub mod locator;
pub mod reader;

pub use catalog::{read_catalog, read_directory, ZipCatalog};
pub use data_input::ZipDataReader;
pub use entry::{dos_to_datetime, CompressionMethod, EntryType, ZipEntry};
pub use error::{Result, ZipError};
pub use extract::{extract, ExtractOptions, Extractor};
pub use limited::LimitedReader;
pub use locator::{find_directory, locate_eocd};
pub use reader::{
    decompress, open_entry, open_entry_at, read_local_header, EntryReader, StreamingZipReader,
};
