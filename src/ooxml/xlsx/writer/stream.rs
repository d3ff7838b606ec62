//! Buffered, patchable output for a single package part.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::Result;

/// Buffered writer for one part that remembers how many bytes it has written.
///
/// Tracking the position locally keeps [`PartWriter::position`] free of
/// flushes, and [`PartWriter::patch_at`] rewrites a previously written range in
/// place and then returns to the end of the stream.
#[derive(Debug)]
pub struct PartWriter<W: Write + Seek> {
    inner: BufWriter<W>,
    start: u64,
    written: u64,
}

impl PartWriter<File> {
    /// Create (or truncate) a staging file.
    pub fn create(path: &Path) -> Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write + Seek> PartWriter<W> {
    pub fn new(mut inner: W) -> Result<Self> {
        let start = inner.stream_position()?;
        Ok(Self {
            inner: BufWriter::with_capacity(64 * 1024, inner),
            start,
            written: 0,
        })
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.inner.write_all(text.as_bytes())?;
        self.written += text.len() as u64;
        Ok(())
    }

    /// Offset of the next byte, relative to where this writer started.
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Overwrite bytes at `offset` without changing the stream length.
    ///
    /// The range must lie entirely within what has already been written.
    pub fn patch_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let end = offset + bytes.len() as u64;
        if end > self.written {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "patch range extends past the written data",
            )
            .into());
        }
        self.inner.seek(SeekFrom::Start(self.start + offset))?;
        self.inner.write_all(bytes)?;
        self.inner.seek(SeekFrom::Start(self.start + self.written))?;
        Ok(())
    }

    /// Flush buffered bytes and hand back the underlying stream.
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| crate::common::Error::Io(e.into_error()))
    }
}
