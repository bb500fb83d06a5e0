//! Little-endian binary cursor over a byte source
//!
//! Every multi-byte integer in a ZIP archive is little-endian. [`ZipDataReader`]
//! reads them one field at a time from any [`Read`] and keeps a running count of
//! consumed bytes.

use crate::error::{Result, ZipError};
use std::io::{self, Read};

/// Sequential little-endian reader that tracks how many bytes it has consumed
#[derive(Debug)]
pub struct ZipDataReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ZipDataReader<R> {
    /// Wrap a byte source. The offset counter starts at zero.
    pub fn new(inner: R) -> Self {
        ZipDataReader { inner, offset: 0 }
    }

    /// Total number of bytes consumed through this reader so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Unwrap the underlying byte source at its current position
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read a single byte, `None` at end of stream
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Fill `buf` completely or fail with [`ZipError::UnexpectedEof`]
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.offset += filled as u64;
                    return Err(ZipError::UnexpectedEof);
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.offset += filled as u64;
                    return Err(e.into());
                }
            }
        }
        self.offset += filled as u64;
        Ok(())
    }

    /// Read `len` bytes into a fresh vector
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_fully(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_fully(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_fully(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_i64_le(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_fully(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Discard exactly `n` bytes by reading them
    pub fn skip_fully(&mut self, n: u64) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())
            .map_err(ZipError::from_read)?;
        self.offset += skipped;
        if skipped < n {
            return Err(ZipError::UnexpectedEof);
        }
        Ok(())
    }
}

impl<R: Read> Read for ZipDataReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}
