//! Streaming bzip2 helpers.

use std::io::{self, Read, Write};

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;

use crate::common::{CountingSink, CountingWriter};

/// Compression level, `0` meaning "codec default".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Bzip2Level(u32);

impl Bzip2Level {
    /// Builds a level from the shared `0..=9` scale.
    #[must_use]
    pub const fn from_numeric(level: u32) -> Self {
        Self(if level > 9 { 9 } else { level })
    }
}

impl From<Bzip2Level> for Compression {
    fn from(level: Bzip2Level) -> Self {
        if level.0 == 0 {
            Compression::default()
        } else {
            Compression::new(level.0)
        }
    }
}

/// Streaming bzip2 encoder that records the number of compressed bytes produced.
pub struct CountingBzEncoder<W = CountingSink>
where
    W: Write,
{
    inner: BzEncoder<CountingWriter<W>>,
}

impl CountingBzEncoder<CountingSink> {
    /// Creates an encoder that discards compressed output while tracking its length.
    #[must_use]
    pub fn new(level: Bzip2Level) -> Self {
        Self::with_sink(CountingSink, level)
    }
}

impl<W> CountingBzEncoder<W>
where
    W: Write,
{
    /// Creates an encoder that writes compressed bytes into `sink`.
    #[must_use]
    pub fn with_sink(sink: W, level: Bzip2Level) -> Self {
        Self {
            inner: BzEncoder::new(CountingWriter::new(sink), level.into()),
        }
    }

    /// Returns the number of compressed bytes produced so far.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.inner.get_ref().bytes()
    }

    /// Completes the stream and returns the sink together with the byte count.
    pub fn finish_into_inner(self) -> io::Result<(W, u64)> {
        let writer = self.inner.finish()?;
        Ok(writer.into_parts())
    }
}

impl<W> Write for CountingBzEncoder<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming bzip2 decoder.
pub struct BzDecoderReader<R> {
    inner: BzDecoder<R>,
}

impl<R> BzDecoderReader<R>
where
    R: Read,
{
    /// Wraps `reader` in a bzip2 decoder.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            inner: BzDecoder::new(reader),
        }
    }
}

impl<R> Read for BzDecoderReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
