//! Byte sources feeding the lexer.
//!
//! A [`ByteSource`] hands the parser one chunk at a time and never seeks.
//! Chunks may be any size and may split multi-byte constructs (strings,
//! numbers, escapes) at any position; the lexer is responsible for stitching
//! lexemes back together. Sources release their underlying resource when
//! dropped, on every exit path.

use std::io::{self, Read};

/// Default window served by [`SliceSource`], and the read buffer size used by
/// [`ReadSource`]. Bounds the parser's resident chunk regardless of input
/// size.
const DEFAULT_CHUNK: usize = 64 * 1024;

/// A finite, lazy sequence of byte chunks.
pub trait ByteSource {
    /// Returns the next chunk, `Ok(None)` at end of stream, or an I/O error.
    ///
    /// The returned slice is only valid until the next call. Implementations
    /// should not return empty chunks; callers must tolerate them by asking
    /// again.
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>>;
}

/// In-memory bytes, served in bounded windows.
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    window: usize,
}

impl<'a> SliceSource<'a> {
    /// Serves `data` in windows of a default bounded size.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_chunk_size(data, DEFAULT_CHUNK)
    }

    /// Serves `data` in windows of exactly `chunk_size` bytes (final window
    /// may be shorter). Useful for exercising chunk-boundary behavior.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    #[must_use]
    pub fn with_chunk_size(data: &'a [u8], chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            data,
            pos: 0,
            window: chunk_size,
        }
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let end = self.data.len().min(self.pos + self.window);
        let chunk = &self.data[self.pos..end];
        self.pos = end;
        Ok(Some(chunk))
    }
}

/// Wraps any [`Read`] with a fixed internal buffer.
///
/// Dropping the source drops the reader, closing files and sockets through
/// their own `Drop` impls.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: Read> ReadSource<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0u8; DEFAULT_CHUNK],
        }
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(&self.buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}
