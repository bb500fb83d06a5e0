//! Extract a whole archive into a directory

use crate::catalog::ZipCatalog;
use crate::entry::{EntryType, ZipEntry};
use crate::error::{Result, ZipError};
use crate::reader::StreamingZipReader;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Default copy buffer size for extraction
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Options for [`Extractor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Size of the buffer used when writing extracted files
    pub buffer_size: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Materializes every file and directory entry of an archive under a destination
///
/// Directories created during a run are remembered so shared prefixes are only
/// created once.
#[derive(Debug)]
pub struct Extractor {
    dest: PathBuf,
    options: ExtractOptions,
    created_dirs: HashSet<PathBuf>,
}

impl Extractor {
    /// Create an extractor writing below `dest`, which must be an existing directory.
    pub fn new<P: AsRef<Path>>(dest: P) -> Result<Self> {
        let dest = dest.as_ref().to_path_buf();
        if !dest.is_dir() {
            return Err(ZipError::NotADirectory(dest));
        }
        Ok(Extractor {
            dest,
            options: ExtractOptions::default(),
            created_dirs: HashSet::new(),
        })
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract every entry of the archive at `archive`
    pub fn extract<P: AsRef<Path>>(&mut self, archive: P) -> Result<()> {
        let reader = StreamingZipReader::open(archive)?;
        self.extract_reader(&reader)
    }

    /// Extract every entry of an already opened archive, in directory order.
    ///
    /// The first failing entry aborts the run.
    pub fn extract_reader(&mut self, reader: &StreamingZipReader) -> Result<()> {
        let catalog: &ZipCatalog = reader.catalog();
        debug!(
            archive = %reader.path().display(),
            dest = %self.dest.display(),
            entries = catalog.len(),
            "extracting archive"
        );

        for entry in catalog {
            match entry.entry_type {
                EntryType::Directory => {
                    let target = self.target_path(entry)?;
                    self.ensure_dir(&target)?;
                }
                EntryType::File => self.extract_file(reader, entry)?,
                EntryType::Other => {
                    warn!(name = %entry.name, "skipping entry of unsupported type");
                }
            }
        }
        Ok(())
    }

    fn extract_file(&mut self, reader: &StreamingZipReader, entry: &ZipEntry) -> Result<()> {
        let target = self.target_path(entry)?;
        if let Some(parent) = target.parent() {
            self.ensure_dir(parent)?;
        }

        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut output = BufWriter::with_capacity(self.options.buffer_size, File::create(&target)?);
        let mut input = reader.open_entry(entry)?;
        let copied = io::copy(&mut input, &mut output)?;
        output.flush()?;
        input.close();

        debug!(name = %entry.name, bytes = copied, "extracted file");
        Ok(())
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<()> {
        if self.created_dirs.contains(dir) {
            return Ok(());
        }
        fs::create_dir_all(dir)?;
        // every ancestor below the destination exists now as well
        let mut current = Some(dir);
        while let Some(path) = current {
            if path == self.dest || !self.created_dirs.insert(path.to_path_buf()) {
                break;
            }
            current = path.parent();
        }
        Ok(())
    }

    /// Resolve an entry name below the destination, refusing paths that escape it.
    fn target_path(&self, entry: &ZipEntry) -> Result<PathBuf> {
        let mut target = self.dest.clone();
        for component in Path::new(&entry.name).components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ZipError::InvalidFormat(format!(
                        "entry name \"{}\" escapes the destination directory",
                        entry.name
                    )));
                }
            }
        }
        Ok(target)
    }
}

/// Extract the archive at `archive` into the existing directory `dest`
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, dest: Q) -> Result<()> {
    Extractor::new(dest)?.extract(archive)
}
