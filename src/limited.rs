//! Bounded byte stream
//!
//! [`LimitedReader`] caps the number of bytes that can be drawn from the reader it
//! owns. It is what keeps an entry's decompressor from running into the next entry
//! or into the central directory.

use std::io::{self, Read};

/// Reader that yields at most `limit` bytes from the wrapped source
///
/// Unlike [`std::io::Take`], closing it releases the wrapped source immediately.
#[derive(Debug)]
pub struct LimitedReader<R> {
    inner: Option<R>,
    remaining: u64,
}

impl<R: Read> LimitedReader<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        LimitedReader {
            inner: Some(inner),
            remaining: limit,
        }
    }

    /// Bytes that may still be read before the limit is hit
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Unwrap the source without closing it. `None` once closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }

    /// Drop the wrapped source and zero the limit. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.remaining = 0;
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let Some(inner) = self.inner.as_mut() else {
            return Ok(0);
        };

        let max = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(buf.len());
        let n = inner.read(&mut buf[..max])?;
        if n == 0 {
            // source ran dry before the limit
            self.remaining = 0;
        } else {
            self.remaining -= n as u64;
        }
        Ok(n)
    }
}
